// Prompt templates for each writing service.
// Placeholders are `{input_id}` and are filled by `render::render_prompt`.

pub const ENHANCEMENT_TEMPLATE: &str = r#"Here is my current resume: ```
{resume}
```

Optimize it for a "{role}" position. Emphasize my experience with "{vessel}" and key competencies like "{competencies}". Rewrite my experience with powerful maritime action verbs and ensure it passes ATS scans by major crewing agencies and ship managers. Format the output in clean Markdown."#;

pub const ANALYSIS_TEMPLATE: &str = r#"Here is my background: ```
{background}
```

Analyze my sea-time, vessel experience, and tickets. List 10 potential career steps (including both sea-going and shore-based roles) I am qualified for. Please rank them by salary potential, work-life balance (rotation), and current demand in the maritime market. Present this as a well-structured Markdown table."#;

pub const AUDIT_TEMPLATE: &str = r#"Job description: ```
{job_description}
```

My resume: ```
{resume}
```

Audit my resume against this job. Provide a percentage match score. Identify all missing maritime keywords, specific certifications (like 'High Voltage' or 'Gas-Ex'), and vessel-specific experience they are looking for. Then, rewrite my professional profile and experience sections to achieve a 90%+ match for this specific role. Format the output in clean Markdown, with clear sections for the audit and the rewritten parts."#;

pub const INTERVIEW_TEMPLATE: &str = r#"I am interviewing for the position of: "{role}". Create 15 realistic interview questions for this role. The questions should be divided into three categories: 5 technical questions (e.g., 'Describe your process for troubleshooting a main engine automation fault'), 5 situational/safety questions (e.g., 'What are your first actions during a blackout?'), and 5 behavioral/management questions (e.g., 'How do you manage a tired and unmotivated engine room crew mid-contract?'). For each question, provide a strong, detailed model answer that a top candidate would give. Format the output in clean Markdown."#;

pub const PROOF_BUILDING_TEMPLATE: &str = r#"My target role is: "{role}". Generate 3 practical, impactful portfolio or project ideas that I can complete within a week to showcase my skills and boost my credibility for this role. For each idea, describe the project, what skills it demonstrates, and how to present it in a resume or portfolio."#;

pub const SALARY_TEMPLATE: &str = r#"I have received a job offer for the role of "{role}" for the amount of "{offer}". Write a polite but compelling script (for an email or phone call) to negotiate a 15–20% higher compensation. The script should express enthusiasm for the role, justify the request with references to market rates and my skills, and maintain a positive and professional tone without appearing demanding. Provide a few variations or key talking points."#;

pub const FOLLOW_UP_TEMPLATE: &str = r#"Recruiter's Name: {recruiter}. Position: {role}. Write a short, professional, and engaging follow-up email. The goal is to remind them of my qualifications and keep me top of mind effectively without being pushy. Assume the interview was 2 days ago."#;

pub const COVER_LETTER_TEMPLATE: &str = r#"Based on my resume: ```
{resume}
``` and the job description: ```
{job_description}
``` for the role at {company_name}, please draft a compelling cover letter. Highlight my relevant maritime experience, skills, and enthusiasm for the role and company."#;
