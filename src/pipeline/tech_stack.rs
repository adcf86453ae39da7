/// Target platform, derived from the request's free-form platform label.
/// The set is closed; anything unrecognized falls back to `Unspecified`
/// rather than failing validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Web,
    Mobile,
    WebAndMobile,
    Unspecified,
}

impl Platform {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Web" => Platform::Web,
            "Mobile" => Platform::Mobile,
            "Web & Mobile" => Platform::WebAndMobile,
            _ => Platform::Unspecified,
        }
    }
}

/// Fixed bundle of technology names and per-platform notes, embedded into
/// generated instruction text. Lookup-derived, never caller-supplied.
#[derive(Debug, Clone, Copy)]
pub struct TechStack {
    pub stack: &'static str,
    pub details: &'static str,
    /// Database wording embedded into feature prompts.
    pub database_hint: &'static str,
}

pub fn for_platform(platform: Platform) -> TechStack {
    match platform {
        Platform::Web => TechStack {
            stack: "Next.js, Tailwind CSS, Prisma, NeonDB, Cloudinary, Shadcn UI, Clerk Auth",
            details: "- Framework: Next.js (App Router)\n\
                      - Styling: Tailwind CSS\n\
                      - UI Components: Shadcn UI\n\
                      - Database: Prisma with NeonDB (PostgreSQL)\n\
                      - File Storage: Cloudinary\n\
                      - Authentication: Clerk Auth",
            database_hint: "Prisma + NeonDB",
        },
        Platform::Mobile => TechStack {
            stack: "React Native, Expo, Firebase",
            details: "- Framework: React Native with Expo\n\
                      - Backend: Firebase (Authentication, Firestore, Storage)\n\
                      - Navigation: React Navigation",
            database_hint: "Firebase Firestore",
        },
        Platform::WebAndMobile => TechStack {
            stack: "Next.js + React Native with shared backend",
            details: "Web Stack:\n\
                      - Framework: Next.js (App Router)\n\
                      - Styling: Tailwind CSS\n\
                      - UI Components: Shadcn UI\n\
                      - Database: Prisma with NeonDB (PostgreSQL)\n\
                      - File Storage: Cloudinary\n\
                      - Authentication: Clerk Auth\n\
                      \n\
                      Mobile Stack:\n\
                      - Framework: React Native with Expo\n\
                      - Backend: Shared API endpoints from Next.js\n\
                      - Authentication: Clerk Auth (shared with web)",
            database_hint: "Prisma + NeonDB for web, Firebase for mobile",
        },
        Platform::Unspecified => TechStack {
            stack: "To be determined",
            details: "",
            database_hint: "the chosen database",
        },
    }
}

/// Auth wording embedded into feature prompts' security section.
pub fn auth_hint(platform: Platform) -> &'static str {
    match platform {
        Platform::Web | Platform::WebAndMobile => "Clerk Auth",
        Platform::Mobile => "Firebase Auth",
        Platform::Unspecified => "the chosen auth provider",
    }
}
