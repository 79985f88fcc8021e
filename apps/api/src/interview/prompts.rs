// All LLM prompt templates for the interview capabilities.
// Placeholder syntax is documented in interview/template.rs.
// The expected JSON shape is appended to each system prompt by llm_client::invoke.

use std::sync::OnceLock;

use crate::interview::template::{PromptTemplate, TemplateError};

/// Number of questions requested per interview.
pub const QUESTION_COUNT: usize = 5;

pub const QUESTIONS_TEMPERATURE: f32 = 0.8;
pub const ANSWER_TEMPERATURE: f32 = 0.7;
pub const FEEDBACK_TEMPERATURE: f32 = 0.3;

pub const QUESTIONS_SYSTEM: &str = "You are a senior technical interviewer preparing a \
    mock interview. You write specific, realistic questions that demand in-depth answers.";

/// Replace: {question_count}, {experience_level}, {role}, {specialty}, {topic},
///          optional {target_company}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate {question_count} specific and detailed interview questions for a {experience_level} {role} specializing in {specialty} on the topic of {topic}{?target_company} targeting a position at {target_company}{/target_company}.

Cover a range of difficulty:
1. One foundational conceptual question.
2. Two practical problem-solving or coding questions.
3. One behavioral question tied to the specialty and topic.
4. One system design or architecture question pitched at the experience level.

Every question must be distinct and require an in-depth answer. Return them in the order they should be asked."#;

pub const ANSWER_SYSTEM: &str = "You are an expert interview coach. You help candidates \
    craft strong, honest answers grounded in the job they are applying for. \
    Your tone is professional and supportive.";

/// Replace: {experience_level}, {job_description}, {interview_question}
pub const ANSWER_PROMPT_TEMPLATE: &str = r#"Help a {experience_level} candidate craft an exceptional answer to one interview question, using the job description for context.

Job Description:
---
{job_description}
---

Interview Question:
"{interview_question}"

Produce:
1. answer: a detailed answer tailored to the job description. For behavioral questions use the STAR method (Situation, Task, Action, Result) and tie the story to the skills the job asks for. For technical questions give a clear, accurate and complete explanation.
2. keyPoints: the essential points the answer must cover, one short phrase each.
3. deliveryTips: actionable advice on delivering the answer with confidence and clarity (tone of voice, pacing, engaging the interviewer)."#;

pub const FEEDBACK_SYSTEM: &str = "You are an experienced technical interviewer giving a \
    candidate constructive, balanced feedback on a mock interview. \
    You are fair, specific and supportive.";

/// Replace: {experience_level}, {user_role}, {technical_specialty}, {interview_transcript},
///          optional {target_company}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Evaluate the following interview for a {experience_level} {user_role} specializing in {technical_specialty}{?target_company} targeting a position at {target_company}{/target_company}.

Transcript (Q: interviewer, A: candidate):
---
{interview_transcript}
---

Provide:
1. score: a number from 1 to 10. An average performance is around 5-6; 9-10 is exceptional.
2. strengths: what the candidate did well, with specifics.
3. weaknesses: technical mistakes or weak explanations. Quote the transcript and explain why each is a problem.
4. communicationAnalysis: was the delivery clear, structured and confident? Did the candidate seem rushed or unsure?
5. improvementTips: a numbered list of 3-5 encouraging, actionable tips, written as one string ("1. ... 2. ...")."#;

type Parsed = Result<PromptTemplate, TemplateError>;

fn parsed(
    cell: &'static OnceLock<Parsed>,
    source: &str,
) -> Result<&'static PromptTemplate, TemplateError> {
    cell.get_or_init(|| PromptTemplate::parse(source))
        .as_ref()
        .map_err(Clone::clone)
}

/// Parsed once, on first use.
pub fn questions_template() -> Result<&'static PromptTemplate, TemplateError> {
    static CELL: OnceLock<Parsed> = OnceLock::new();
    parsed(&CELL, QUESTIONS_PROMPT_TEMPLATE)
}

pub fn answer_template() -> Result<&'static PromptTemplate, TemplateError> {
    static CELL: OnceLock<Parsed> = OnceLock::new();
    parsed(&CELL, ANSWER_PROMPT_TEMPLATE)
}

pub fn feedback_template() -> Result<&'static PromptTemplate, TemplateError> {
    static CELL: OnceLock<Parsed> = OnceLock::new();
    parsed(&CELL, FEEDBACK_PROMPT_TEMPLATE)
}

/// Parses every template so a broken one stops startup instead of turning each
/// request into a fallback.
pub fn validate_templates() -> Result<(), TemplateError> {
    questions_template()?;
    answer_template()?;
    feedback_template()?;
    Ok(())
}
