//! Fixed code lists: the program catalogue and the decline reasons.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Program {
    ComputerScience,
    ArtificialIntelligence,
    Robotics,
    Biotechnology,
    QuantumComputing,
    SpaceTechnology,
}

impl Program {
    pub const ALL: [Program; 6] = [
        Program::ComputerScience,
        Program::ArtificialIntelligence,
        Program::Robotics,
        Program::Biotechnology,
        Program::QuantumComputing,
        Program::SpaceTechnology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Program::ComputerScience => "computer-science",
            Program::ArtificialIntelligence => "artificial-intelligence",
            Program::Robotics => "robotics",
            Program::Biotechnology => "biotechnology",
            Program::QuantumComputing => "quantum-computing",
            Program::SpaceTechnology => "space-technology",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Program::ComputerScience => "Computer Science",
            Program::ArtificialIntelligence => "Artificial Intelligence",
            Program::Robotics => "Robotics Engineering",
            Program::Biotechnology => "Biotechnology",
            Program::QuantumComputing => "Quantum Computing",
            Program::SpaceTechnology => "Space Technology",
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Program::ALL
            .into_iter()
            .find(|program| program.as_str() == value)
            .ok_or_else(|| StoreError::validation(format!("unknown program '{value}'")))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DeclineReason {
    IncompleteDocuments,
    AcademicRequirements,
    ProgramFull,
    EligibilityCriteria,
    Other,
}

impl DeclineReason {
    pub const ALL: [DeclineReason; 5] = [
        DeclineReason::IncompleteDocuments,
        DeclineReason::AcademicRequirements,
        DeclineReason::ProgramFull,
        DeclineReason::EligibilityCriteria,
        DeclineReason::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeclineReason::IncompleteDocuments => "incomplete-documents",
            DeclineReason::AcademicRequirements => "academic-requirements",
            DeclineReason::ProgramFull => "program-full",
            DeclineReason::EligibilityCriteria => "eligibility-criteria",
            DeclineReason::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeclineReason::IncompleteDocuments => "Incomplete Documents",
            DeclineReason::AcademicRequirements => "Academic Requirements Not Met",
            DeclineReason::ProgramFull => "Program Full",
            DeclineReason::EligibilityCriteria => "Eligibility Criteria Not Met",
            DeclineReason::Other => "Other",
        }
    }

    /// Parse an optional reason code as submitted by the decline form.
    /// A missing or blank code is a validation failure.
    pub fn parse_required(code: Option<&str>) -> Result<Self, StoreError> {
        match code.map(str::trim) {
            None | Some("") => Err(StoreError::validation("a decline reason is required")),
            Some(code) => code.parse(),
        }
    }
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeclineReason {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DeclineReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == value)
            .ok_or_else(|| StoreError::validation(format!("unknown decline reason '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_codes_parse() {
        for program in Program::ALL {
            assert_eq!(program.as_str().parse::<Program>().unwrap(), program);
        }
        assert!("underwater-basket-weaving".parse::<Program>().is_err());
    }

    #[test]
    fn program_serializes_as_code() {
        let json = serde_json::to_string(&Program::QuantumComputing).unwrap();
        assert_eq!(json, "\"quantum-computing\"");
        assert_eq!(Program::Robotics.display_name(), "Robotics Engineering");
    }

    #[test]
    fn decline_reason_required() {
        assert!(matches!(
            DeclineReason::parse_required(None),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            DeclineReason::parse_required(Some("  ")),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(
            DeclineReason::parse_required(Some("program-full")).unwrap(),
            DeclineReason::ProgramFull
        );
    }

    #[test]
    fn unknown_decline_reason_rejected() {
        let err = DeclineReason::parse_required(Some("bad-vibes")).unwrap_err();
        assert_eq!(err.to_string(), "unknown decline reason 'bad-vibes'");
    }
}
