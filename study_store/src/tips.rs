use crate::record::Domain;

const READING_TIPS: &str = "\
The Reading section tests how well you understand university-level academic texts. \
Expect 3 or 4 passages of about 700 words, each followed by roughly 10 multiple-choice \
questions. No prior knowledge is needed, everything is in the text. The whole section \
takes between 54 and 72 minutes.

Tips:
1. Manage your time. Aim for about 18 minutes per passage. If a question is too hard, \
make your best guess and move on.

2. Stay with the text. Every answer is stated in the passage or can be inferred from it. \
Leave outside knowledge aside.

3. Eliminate. Strike out the choices that are clearly wrong before picking one.

4. Follow the passage order. Apart from summary questions, questions follow the order of \
the passage, so the answer to question 4 comes after the answer to question 3.";

const LISTENING_TIPS: &str = "\
The Listening section measures how well you understand spoken English in academic settings. \
You listen to clips once and answer questions about them:

- Lectures: 3-5 minutes, a professor talking, sometimes with student questions.
- Conversations: about 3 minutes, two speakers in a university setting.

Note taking is allowed. The whole section takes about 41 to 57 minutes.

Tips:
1. Take effective notes. Capture main ideas, key terms, examples and how concepts relate. \
Use abbreviations and symbols.

2. Listen for the main idea. The first sentences usually introduce the topic or purpose.

3. Track the speaker's purpose and attitude. Tone and intonation tell you whether they are \
certain, doubtful or surprised.

4. Follow the signposts. Words like \"First\", \"However\" or \"To sum up\" show how the \
talk is organised.";

const SPEAKING_TIPS: &str = "\
The Speaking section evaluates how clearly you communicate your ideas in spoken English. \
It takes about 17 minutes and has 4 tasks:

- Task 1 (Independent): state and defend an opinion. 15 seconds to prepare, 45 to speak.
- Tasks 2 & 3 (Integrated): read a passage, listen to a related clip, then connect them. \
30 seconds to prepare, 60 to speak.
- Task 4 (Integrated): summarise a short lecture. 20 seconds to prepare, 60 to speak.

Tips:
1. Structure every answer, even a 60-second one. Follow the templates.
2. For integrated tasks, keep reading points and listening points in two columns.
3. Use transitions such as \"First of all\", \"For example\", \"In contrast\".
4. Keep a steady pace. Practise against a timer for the 45 and 60 second limits.
5. Small grammar slips are fine. Correct quickly and keep going.";

pub const SPEAKING_TEMPLATES: &str = "\
Task 1: I believe that ... First, ... For example, ... Second, ... That is why I think ...
Task 2: The university plans to ... The student agrees/disagrees because ... First, ... Second, ...
Task 3: The reading defines ... The professor illustrates this with ... First, ... Then, ...
Task 4: The professor discusses ... The first point is ... The second point is ...";

pub fn tips_for(domain: Domain) -> &'static str {
    match domain {
        Domain::Reading => READING_TIPS,
        Domain::Listening => LISTENING_TIPS,
        Domain::Speaking => SPEAKING_TIPS,
    }
}
