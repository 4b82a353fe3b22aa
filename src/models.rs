use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

// Fields stay untyped until aggregation; the portal mixes numbers and numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub attended: Option<Value>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub percentage: Option<Value>,
}

impl CourseRecord {
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Safe,
    Caution,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallTier {
    Safe,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub code: String,
    pub attended: u64,
    pub total: u64,
    pub percentage: f64,
    pub risk_tier: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub per_course: Vec<CourseSummary>,
    pub total_attended: u64,
    pub total_conducted: u64,
    pub overall_percentage: f64,
    pub overall_tier: OverallTier,
    pub no_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    Connecting,
    LoggingIn,
    Analyzing,
}

impl ProgressStage {
    pub fn label(self) -> &'static str {
        match self {
            ProgressStage::Connecting => "Connecting to attendance portal...",
            ProgressStage::LoggingIn => "Logging in securely...",
            ProgressStage::Analyzing => "Analyzing attendance records...",
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            ProgressStage::Connecting => 10,
            ProgressStage::LoggingIn => 45,
            ProgressStage::Analyzing => 85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    AuthFailed,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub stage: ProgressStage,
    pub label: &'static str,
    pub percent: u8,
}

impl From<ProgressStage> for Progress {
    fn from(stage: ProgressStage) -> Self {
        Self {
            stage,
            label: stage.label(),
            percent: stage.percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub student_name: String,
    pub username: String,
    pub summary: AggregateResult,
    pub fetched_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    LoggedOut,
    Attempting { username: String, progress: Progress },
    Dashboard(Dashboard),
    LoginError { message: String, kind: FailureKind },
}

impl SessionPhase {
    pub fn is_attempting(&self) -> bool {
        matches!(self, SessionPhase::Attempting { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub attempt: u64,
    pub resumable: bool,
    #[serde(flatten)]
    pub phase: SessionPhase,
}

impl SessionState {
    pub fn logged_out(attempt: u64, resumable: bool) -> Self {
        Self {
            attempt,
            resumable,
            phase: SessionPhase::LoggedOut,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct PortalData {
    pub student_name: String,
    pub records: Vec<CourseRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PortalResponse {
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}
