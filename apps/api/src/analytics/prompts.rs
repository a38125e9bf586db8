pub const INSIGHTS_SYSTEM: &str = "You are an expert in analyzing interview transcripts. \
    You must only use the main questions provided and not generate or infer additional questions.";

pub const INSIGHTS_PROMPT: &str = r#"Analyse the following interview transcript and the main interview questions.

###
Transcript: {transcript}

Main Interview Questions:
{questions}

Based on this transcript and the provided main interview questions, generate the following analytics in JSON format:
1. Overall Score (0-100) and Overall Feedback (60 words): consider communication skills, time taken to answer, confidence, clarity, attitude and relevance of answers.
   - Deduct points for distractions, rambling or answers that do not address the question.
2. Communication Skills: a score (0-10) and feedback (60 words), judged on clarity, articulation and use of language.
3. Summary for each main interview question, in the order they were asked:
   - Use ONLY the main questions provided, do not add follow-up questions.
   - If a question was not asked, the summary must be "Not Asked".
   - If a question was asked but not answered, the summary must be "Not Answered".
   - Otherwise summarize the candidate's answer in the third person, without a leading "The candidate said".
4. Soft Skills summary (max 10 words) covering confidence, leadership, adaptability, critical thinking and decision making.

Return a JSON object with the following structure:
{
  "overallScore": number,
  "overallFeedback": string,
  "communication": { "score": number, "feedback": string },
  "questionSummaries": [{ "question": string, "summary": string }],
  "softSkillSummary": string
}"#;
