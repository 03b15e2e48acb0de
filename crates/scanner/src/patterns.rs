//! Built-in pattern library.
//!
//! Every entry carries a stable id that doubles as the seed policy id for
//! the system tier. [`builtin_patterns`] returns the full set;
//! [`seed_policies`] converts it into system-tier [`Policy`] rows for
//! stores that start empty.

use warden_core::{Policy, PolicyAction, PolicyCategory, Severity};

/// A built-in detection pattern.
#[derive(Debug, Clone)]
pub struct BuiltinPattern {
    /// Stable identifier (e.g. `"sqli-union-select"`).
    pub id: &'static str,
    /// Which category this pattern belongs to.
    pub category: PolicyCategory,
    /// Human-readable description, used as the seed policy name.
    pub description: &'static str,
    /// Raw regex source (compiled into a `RegexSet`).
    pub regex_str: &'static str,
    /// Severity when this pattern matches.
    pub severity: Severity,
    /// Default action for the seed policy.
    pub action: PolicyAction,
}

macro_rules! pat {
    ($id:expr, $cat:expr, $desc:expr, $re:expr, $sev:expr, $act:expr) => {
        BuiltinPattern {
            id: $id,
            category: $cat,
            description: $desc,
            regex_str: $re,
            severity: $sev,
            action: $act,
        }
    };
}

/// Returns the full set of built-in detection patterns.
#[allow(clippy::too_many_lines)]
#[must_use]
pub fn builtin_patterns() -> Vec<BuiltinPattern> {
    use PolicyAction::{Block, Redact, Warn};
    use PolicyCategory::{
        AdminAccess, CodeSecrets, CodeUnsafe, DangerousOp, PiiUs, SecuritySqli,
    };
    use Severity::{Critical, High, Low, Medium};

    vec![
        // -- SQL injection --------------------------------------------------
        pat!(
            "sqli-union-select",
            SecuritySqli,
            "SQL injection: UNION SELECT",
            r"(?i)\bunion\b(\s+all)?\s+select\b",
            Critical,
            Block
        ),
        pat!(
            "sqli-tautology",
            SecuritySqli,
            "SQL injection: quoted tautology",
            r#"(?i)['"]\s*(or|and)\s*['"]?1['"]?\s*=\s*['"]?1"#,
            Critical,
            Block
        ),
        pat!(
            "sqli-constant-truth",
            SecuritySqli,
            "SQL injection: OR/AND with constant truth",
            r"(?i)\b(or|and)\s+\d+\s*=\s*\d+",
            High,
            Block
        ),
        pat!(
            "sqli-comment",
            SecuritySqli,
            "SQL injection: inline comment",
            r"(?s)(['\s]--)|(/\*.*?\*/)",
            High,
            Block
        ),
        pat!(
            "sqli-stacked",
            SecuritySqli,
            "SQL injection: stacked statement",
            r"(?i);\s*(select|insert|update|delete|drop|create|alter|truncate)\b",
            Critical,
            Block
        ),
        pat!(
            "sqli-time-based",
            SecuritySqli,
            "SQL injection: time-based probe",
            r"(?i)\b(sleep\s*\(|benchmark\s*\(|pg_sleep\s*\(|waitfor\s+delay)",
            Critical,
            Block
        ),
        // -- Dangerous operations -------------------------------------------
        pat!(
            "dangerous-drop",
            DangerousOp,
            "Dangerous operation: DROP statement",
            r"(?i)\bdrop\s+(table|database|schema|index|view)\b",
            Critical,
            Block
        ),
        pat!(
            "dangerous-truncate",
            DangerousOp,
            "Dangerous operation: TRUNCATE",
            r"(?i)\btruncate\s+(table\s+)?\w+",
            Critical,
            Block
        ),
        pat!(
            "dangerous-alter-table",
            DangerousOp,
            "Dangerous operation: ALTER TABLE",
            r"(?i)\balter\s+table\b",
            High,
            Block
        ),
        pat!(
            "dangerous-delete-no-where",
            DangerousOp,
            "Dangerous operation: mass DELETE without WHERE",
            r#"(?im)\bdelete\s+from\s+[\w."]+\s*(;|$)"#,
            Critical,
            Block
        ),
        pat!(
            "dangerous-file-access",
            DangerousOp,
            "Dangerous operation: server file access",
            r"(?i)\b(xp_cmdshell|load_file\s*\(|into\s+(outfile|dumpfile))\b",
            Critical,
            Block
        ),
        // -- US PII ---------------------------------------------------------
        pat!(
            "pii-us-ssn",
            PiiUs,
            "US PII: Social Security number",
            r"\b\d{3}-\d{2}-\d{4}\b",
            High,
            Redact
        ),
        pat!(
            "pii-us-credit-card",
            PiiUs,
            "US PII: payment card number",
            r"\b\d{4}[ -]?\d{4}[ -]?\d{4}[ -]?\d{3,4}\b",
            High,
            Redact
        ),
        pat!(
            "pii-us-email",
            PiiUs,
            "US PII: email address",
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            Low,
            Warn
        ),
        pat!(
            "pii-us-phone",
            PiiUs,
            "US PII: NANP phone number",
            r"\b(\+?1[ .-]?)?\(?[2-9]\d{2}\)?[ .-]?[2-9]\d{2}[ .-]?\d{4}\b",
            Low,
            Warn
        ),
        pat!(
            "pii-us-ipv4",
            PiiUs,
            "US PII: IPv4 address",
            r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b",
            Low,
            Warn
        ),
        pat!(
            "pii-us-routing",
            PiiUs,
            "US PII: ABA routing number",
            r"\b\d{9}\b",
            Medium,
            Redact
        ),
        pat!(
            "pii-us-passport",
            PiiUs,
            "US PII: passport number",
            r"\b[A-Z]\d{8}\b",
            Medium,
            Redact
        ),
        // -- Embedded secrets -----------------------------------------------
        pat!(
            "secret-aws-key",
            CodeSecrets,
            "Secret: AWS access key id",
            r"\bAKIA[0-9A-Z]{16}\b",
            Critical,
            Block
        ),
        pat!(
            "secret-github-token",
            CodeSecrets,
            "Secret: GitHub token",
            r"\bgh[pousr]_[A-Za-z0-9]{36,}\b",
            Critical,
            Block
        ),
        pat!(
            "secret-jwt",
            CodeSecrets,
            "Secret: JWT-shaped token",
            r"\beyJ[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\b",
            High,
            Redact
        ),
        pat!(
            "secret-pem-header",
            CodeSecrets,
            "Secret: PEM private key header",
            r"-----BEGIN (RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----",
            Critical,
            Block
        ),
        pat!(
            "secret-credential-assignment",
            CodeSecrets,
            "Secret: hardcoded credential assignment",
            r#"(?i)\b(password|passwd|secret|api[_-]?key|access[_-]?token)\s*[:=]\s*['"][^'"]{6,}['"]"#,
            High,
            Redact
        ),
        // -- Unsafe execution -----------------------------------------------
        pat!(
            "unsafe-eval",
            CodeUnsafe,
            "Unsafe execution: eval",
            r"\beval\s*\(",
            High,
            Warn
        ),
        pat!(
            "unsafe-exec",
            CodeUnsafe,
            "Unsafe execution: exec",
            r"\bexec\s*\(",
            High,
            Warn
        ),
        pat!(
            "unsafe-os-system",
            CodeUnsafe,
            "Unsafe execution: os.system",
            r"\bos\.system\s*\(",
            High,
            Warn
        ),
        pat!(
            "unsafe-subprocess",
            CodeUnsafe,
            "Unsafe execution: subprocess with shell",
            r"\bsubprocess\.(run|call|Popen|check_output)\b",
            High,
            Warn
        ),
        pat!(
            "unsafe-child-process",
            CodeUnsafe,
            "Unsafe execution: child_process",
            r"\bchild_process\.(exec|execSync|spawn|spawnSync)\b",
            High,
            Warn
        ),
        pat!(
            "unsafe-pickle-load",
            CodeUnsafe,
            "Unsafe execution: pickle deserialization",
            r"\bpickle\.loads?\s*\(",
            High,
            Warn
        ),
        pat!(
            "unsafe-yaml-load",
            CodeUnsafe,
            "Unsafe execution: unrestricted yaml.load",
            r"\byaml\.load\s*\(",
            Medium,
            Warn
        ),
        pat!(
            "unsafe-inner-html",
            CodeUnsafe,
            "Unsafe execution: unescaped innerHTML assignment",
            r"\.innerHTML\s*=",
            Medium,
            Warn
        ),
        pat!(
            "unsafe-shell-eval",
            CodeUnsafe,
            "Unsafe execution: templated shell eval",
            r#"(?i)\b(ba)?sh\s+-c\s+['"][^'"]*[$`]"#,
            High,
            Warn
        ),
        pat!(
            "unsafe-privileged-container",
            CodeUnsafe,
            "Unsafe execution: privileged container spec",
            r"(?i)(privileged:\s*true|--privileged\b)",
            High,
            Warn
        ),
        // -- Admin-only operations ------------------------------------------
        pat!(
            "admin-user-management",
            AdminAccess,
            "Admin operation: user or role management",
            r"(?i)\b(create|drop|alter)\s+(user|role|login)\b",
            High,
            Warn
        ),
        pat!(
            "admin-grant-revoke",
            AdminAccess,
            "Admin operation: privilege grant or revoke",
            r"(?i)\b(grant|revoke)\s+(all|select|insert|update|delete|execute|usage)\b",
            High,
            Warn
        ),
    ]
}

/// Convert the built-in library into system-tier seed policies.
///
/// Blocking categories get higher priority than advisory ones so the
/// merged evaluation order short-circuits on the worst findings first.
#[must_use]
pub fn seed_policies() -> Vec<Policy> {
    builtin_patterns()
        .into_iter()
        .map(|p| {
            let priority = match p.category {
                PolicyCategory::SecuritySqli | PolicyCategory::DangerousOp => 100,
                PolicyCategory::AdminAccess => 90,
                PolicyCategory::CodeSecrets => 80,
                PolicyCategory::PiiUs | PolicyCategory::PiiIn => 70,
                PolicyCategory::CodeUnsafe | PolicyCategory::CodeCompliance => 60,
            };
            Policy::new(
                p.id,
                p.description,
                p.category,
                p.regex_str,
                p.severity,
                p.action,
            )
            .with_priority(priority)
        })
        .collect()
}
