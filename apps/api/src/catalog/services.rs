use serde::{Deserialize, Serialize};

use crate::catalog::prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    Enhancement,
    Analysis,
    Audit,
    Interview,
    ProofBuilding,
    Salary,
    FollowUp,
    CoverLetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Textarea,
}

/// One form field. `id` is also the `{placeholder}` name in the prompt template.
#[derive(Debug, Clone, Serialize)]
pub struct InputField {
    pub id: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: InputKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u8>,
    pub optional: bool,
}

impl InputField {
    const fn text(id: &'static str, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            id,
            label,
            placeholder,
            kind: InputKind::Text,
            rows: None,
            optional: false,
        }
    }

    const fn textarea(
        id: &'static str,
        label: &'static str,
        placeholder: &'static str,
        rows: u8,
    ) -> Self {
        Self {
            id,
            label,
            placeholder,
            kind: InputKind::Textarea,
            rows: Some(rows),
            optional: false,
        }
    }

    const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: ServiceId,
    pub title: &'static str,
    pub description: &'static str,
    pub inputs: &'static [InputField],
    #[serde(skip)]
    pub prompt_template: &'static str,
}

pub static SERVICES: &[Service] = &[
    Service {
        id: ServiceId::Enhancement,
        title: "Resume Enhancement",
        description: "Optimize your existing resume for a target role, emphasizing key skills and experience with powerful maritime action verbs.",
        inputs: &[
            InputField::textarea("resume", "Your Current Resume", "Paste your full resume here...", 10),
            InputField::text("role", "Target Role", "e.g., Chief Engineer, Technical Superintendent"),
            InputField::text("vessel", "Vessel Type Focus", "e.g., LNG carriers, DP3 AHTS"),
            InputField::text(
                "competencies",
                "Key Competencies",
                "e.g., dry-docking supervision, ISM/ISPS audits, Wärtsilä engine maintenance",
            ),
        ],
        prompt_template: prompts::ENHANCEMENT_TEMPLATE,
    },
    Service {
        id: ServiceId::Analysis,
        title: "Career Alignment Analysis",
        description: "Analyze your sea-time, vessel experience, and tickets to discover potential career steps and opportunities.",
        inputs: &[InputField::textarea(
            "background",
            "Your Background",
            "Paste your experience, key certifications, CoC, sea time, etc. e.g., 2nd Engineer CoC (Unlimited), 4 years on tankers, DP Maintenance",
            10,
        )],
        prompt_template: prompts::ANALYSIS_TEMPLATE,
    },
    Service {
        id: ServiceId::Audit,
        title: "Resume Matching Audit",
        description: "Audit your resume against a specific job description to identify gaps and get a 90%+ match.",
        inputs: &[
            InputField::textarea(
                "job_description",
                "Job Description",
                "Paste the full job posting from Maersk, Bourbon, etc.",
                8,
            ),
            InputField::textarea("resume", "Your Resume", "Paste your full resume here...", 8),
        ],
        prompt_template: prompts::AUDIT_TEMPLATE,
    },
    Service {
        id: ServiceId::Interview,
        title: "Interview Ready Strategy",
        description: "Generate realistic technical, situational, and behavioral interview questions with strong model answers.",
        inputs: &[InputField::text(
            "role",
            "Position You Are Interviewing For",
            "e.g., ETO, Chief Mate",
        )],
        prompt_template: prompts::INTERVIEW_TEMPLATE,
    },
    Service {
        id: ServiceId::ProofBuilding,
        title: "Proof Building Plan",
        description: "Get ideas for portfolio projects you can complete quickly to showcase your skills and boost credibility.",
        inputs: &[InputField::text(
            "role",
            "Your Target Role",
            "e.g., 3rd Engineer, Marine Surveyor",
        )],
        prompt_template: prompts::PROOF_BUILDING_TEMPLATE,
    },
    Service {
        id: ServiceId::Salary,
        title: "Salary Maximization",
        description: "Craft a polite but compelling script to negotiate a 15–20% higher compensation.",
        inputs: &[
            InputField::text(
                "offer",
                "Your Job Offer Amount",
                "e.g., $85,000 USD per year, or 6000 EUR per month",
            ),
            InputField::text("role", "Job Role", "e.g., Second Engineer"),
        ],
        prompt_template: prompts::SALARY_TEMPLATE,
    },
    Service {
        id: ServiceId::FollowUp,
        title: "Follow-up Engagement",
        description: "Write a short, engaging follow-up email to a recruiter to stay top of mind after an interview or application.",
        inputs: &[
            InputField::text("recruiter", "Recruiter's Name", "e.g., Jane Doe"),
            InputField::text("role", "Position Applied For", "e.g., Technical Superintendent"),
        ],
        prompt_template: prompts::FOLLOW_UP_TEMPLATE,
    },
    Service {
        id: ServiceId::CoverLetter,
        title: "AI Cover Letter Generator",
        description: "Generate a tailored cover letter based on your resume and a specific job description.",
        inputs: &[
            InputField::textarea("resume", "Your Resume", "Paste your full resume here...", 8),
            InputField::textarea(
                "job_description",
                "Job Description",
                "Paste the full job posting here...",
                8,
            ),
            InputField::text(
                "company_name",
                "Company Name (Optional)",
                "e.g., Maersk, V.Ships, Tidewater",
            )
            .optional(),
        ],
        prompt_template: prompts::COVER_LETTER_TEMPLATE,
    },
];

pub fn find_service(id: ServiceId) -> Option<&'static Service> {
    SERVICES.iter().find(|s| s.id == id)
}
