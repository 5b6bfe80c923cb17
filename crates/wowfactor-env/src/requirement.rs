//! pip requirement strings and the files derived from them.

use std::fmt;

use sha2::{Digest, Sha256};

/// Distribution names whose import name is not the name with `-` → `_`.
const MODULE_OVERRIDES: &[(&str, &str)] = &[("py-cpuinfo", "cpuinfo")];

/// Characters that end the distribution name in a requirement specifier.
const NAME_TERMINATORS: &[char] = &['=', '<', '>', '~', '!', '[', ';', ' ', '@'];

/// One line of `requirements.txt`, e.g. `psutil` or `py-cpuinfo==9.0.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    spec: String,
}

impl Requirement {
    pub fn new(spec: impl Into<String>) -> Self {
        Self {
            spec: spec.into().trim().to_string(),
        }
    }

    pub fn parse_list<S: AsRef<str>>(specs: &[S]) -> Vec<Requirement> {
        specs
            .iter()
            .map(|s| Requirement::new(s.as_ref()))
            .filter(|r| !r.spec.is_empty())
            .collect()
    }

    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Distribution name without version or extras.
    pub fn name(&self) -> &str {
        let end = self.spec.find(NAME_TERMINATORS).unwrap_or(self.spec.len());
        self.spec[..end].trim()
    }

    /// Name used to import the package from Python.
    pub fn module_name(&self) -> String {
        let name = self.name();
        MODULE_OVERRIDES
            .iter()
            .find(|(dist, _)| dist.eq_ignore_ascii_case(name))
            .map(|(_, module)| module.to_string())
            .unwrap_or_else(|| name.replace('-', "_"))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}

/// Contents of `requirements.txt`: one requirement per line, trailing newline.
pub fn requirements_file_contents(reqs: &[Requirement]) -> String {
    reqs.iter().map(|r| format!("{}\n", r.spec)).collect()
}

/// Hex SHA-256 over the requirement list, used as the install stamp.
pub fn fingerprint(reqs: &[Requirement]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(requirements_file_contents(reqs).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_strips_version_and_extras() {
        assert_eq!(Requirement::new("psutil").name(), "psutil");
        assert_eq!(Requirement::new("py-cpuinfo==9.0.0").name(), "py-cpuinfo");
        assert_eq!(Requirement::new("rich>=13,<14").name(), "rich");
        assert_eq!(Requirement::new("uvicorn[standard]").name(), "uvicorn");
        assert_eq!(
            Requirement::new("tomli; python_version < '3.11'").name(),
            "tomli"
        );
    }

    #[test]
    fn test_module_name_mapping() {
        assert_eq!(Requirement::new("py-cpuinfo").module_name(), "cpuinfo");
        assert_eq!(Requirement::new("prompt-toolkit").module_name(), "prompt_toolkit");
        assert_eq!(Requirement::new("psutil==5.9.8").module_name(), "psutil");
    }

    #[test]
    fn test_parse_list_drops_blanks() {
        let reqs = Requirement::parse_list(&["psutil", "  ", " py-cpuinfo "]);
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1].spec(), "py-cpuinfo");
    }

    #[test]
    fn test_requirements_file_contents() {
        let reqs = Requirement::parse_list(&["psutil", "py-cpuinfo"]);
        assert_eq!(requirements_file_contents(&reqs), "psutil\npy-cpuinfo\n");
    }

    #[test]
    fn test_fingerprint_tracks_list() {
        let a = Requirement::parse_list(&["psutil", "py-cpuinfo"]);
        let b = Requirement::parse_list(&["psutil", "py-cpuinfo==9.0.0"]);
        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 64);
    }
}
