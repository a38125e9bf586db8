pub const QUESTION_GENERATION_SYSTEM: &str = "You are an expert in coming up with follow up \
    questions to uncover deeper insights. You MUST respond with a single valid JSON object.";

pub const QUESTION_GENERATION_PROMPT: &str = r#"Imagine you are an interviewer specialized in designing interview questions to help hiring managers find candidates with strong technical expertise and project experience, making it easier to identify the ideal fit for the role.

Interview Title: {name}
Interview Objective: {objective}

Number of questions to be generated: {number}

Follow these detailed guidelines when crafting the questions:
- Focus on evaluating the candidate's technical knowledge and their experience working on relevant projects. Questions should aim to gauge depth of expertise, problem-solving ability, and hands-on project experience.
- Include questions designed to assess problem-solving skills through practical examples.
- Soft skills such as communication, teamwork, and adaptability should be addressed, but given less emphasis than technical and problem-solving abilities.
- Maintain a professional yet approachable tone, ensuring candidates feel comfortable while demonstrating their knowledge.
- Ask concise and precise open-ended questions that encourage detailed responses. Each question should be 30 words or less.

Use the following context to generate the questions:
{context}

Moreover generate a 50 word or less second-person description about the interview to be shown to the user. It should be in the field 'description'.
Do not use the exact objective in the description. Remember that some details are not to be shown to the user. It should be a small description for the user to understand what the content of the interview would be. Make sure it is clear to the respondent who's taking the interview.

The field 'questions' should take the format of an array of objects with the following key: question.

Strictly output only a JSON object with the keys 'questions' and 'description'."#;
