use std::collections::BTreeSet;

use super::domain::{Field, RecruitmentEntry, RecruitmentInput, Skill};

/// Validation failure raised while turning caller input into recruitment entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecruitmentError {
    #[error("unknown recruitment field '{0}'")]
    UnknownField(String),
    #[error("unknown skill '{0}'")]
    UnknownSkill(String),
    #[error("recruitment head-count must not be negative (got {0})")]
    NegativeHeadCount(i64),
    #[error("recruitment head-count {0} is out of range")]
    HeadCountOverflow(i64),
}

pub fn parse_field(label: &str) -> Result<Field, RecruitmentError> {
    label.parse().map_err(RecruitmentError::UnknownField)
}

pub fn parse_skills<S: AsRef<str>>(labels: &[S]) -> Result<BTreeSet<Skill>, RecruitmentError> {
    labels
        .iter()
        .map(|label| {
            label
                .as_ref()
                .parse::<Skill>()
                .map_err(RecruitmentError::UnknownSkill)
        })
        .collect()
}

impl TryFrom<&RecruitmentInput> for RecruitmentEntry {
    type Error = RecruitmentError;

    fn try_from(input: &RecruitmentInput) -> Result<Self, Self::Error> {
        let field = parse_field(&input.field)?;
        if input.recruit_num < 0 {
            return Err(RecruitmentError::NegativeHeadCount(input.recruit_num));
        }
        let recruit_num = u32::try_from(input.recruit_num)
            .map_err(|_| RecruitmentError::HeadCountOverflow(input.recruit_num))?;
        let skills = parse_skills(&input.skills)?;

        Ok(RecruitmentEntry {
            field,
            recruit_num,
            skills,
            requirement: input.requirement.clone(),
        })
    }
}

/// Validate every entry, failing on the first unrecognized label.
pub fn build_entries(
    inputs: &[RecruitmentInput],
) -> Result<Vec<RecruitmentEntry>, RecruitmentError> {
    inputs.iter().map(RecruitmentEntry::try_from).collect()
}
