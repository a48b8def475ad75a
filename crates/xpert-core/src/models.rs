//! Core data models for xpert.
//!
//! These types are shared across all xpert crates and mirror the camelCase
//! JSON shapes exchanged with the backend persistence API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::defaults;

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// JOB TYPES
// =============================================================================

/// The record a job belongs to.
///
/// Before resolution a job belongs to the scraped [`Expert`]; afterwards it
/// belongs to the resolved [`MetaExpert`]. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobOwner {
    Expert(Uuid),
    MetaExpert(Uuid),
}

impl JobOwner {
    /// Owning expert id, if the job has not been resolved yet.
    pub fn expert_id(&self) -> Option<Uuid> {
        match self {
            JobOwner::Expert(id) => Some(*id),
            JobOwner::MetaExpert(_) => None,
        }
    }

    /// Owning meta-expert id, if the job has been resolved.
    pub fn meta_expert_id(&self) -> Option<Uuid> {
        match self {
            JobOwner::Expert(_) => None,
            JobOwner::MetaExpert(id) => Some(*id),
        }
    }
}

/// One employment or education period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JobRecord", into = "JobRecord")]
pub struct Job {
    pub id: Uuid,
    pub role: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_education: bool,
    /// Filled in by enrichment; stored exactly as the model returned it.
    pub seniority_level: Option<String>,
    pub owner: JobOwner,
}

impl Job {
    /// Create an empty job owned by the given expert.
    pub fn for_expert(expert_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: None,
            company: None,
            description: None,
            industry: None,
            location: None,
            start_date: None,
            end_date: None,
            is_education: false,
            seniority_level: None,
            owner: JobOwner::Expert(expert_id),
        }
    }

    /// Move ownership of this job to a meta-expert.
    pub fn assign_to_meta_expert(&mut self, meta_expert_id: Uuid) {
        self.owner = JobOwner::MetaExpert(meta_expert_id);
    }
}

/// Wire shape of [`Job`]: two nullable owner columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobRecord {
    id: Uuid,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    is_education: bool,
    #[serde(default)]
    seniority_level: Option<String>,
    #[serde(default)]
    expert_id: Option<Uuid>,
    #[serde(default)]
    meta_expert_id: Option<Uuid>,
}

impl TryFrom<JobRecord> for Job {
    type Error = String;

    fn try_from(r: JobRecord) -> Result<Self, Self::Error> {
        let owner = match (r.expert_id, r.meta_expert_id) {
            (Some(id), None) => JobOwner::Expert(id),
            (None, Some(id)) => JobOwner::MetaExpert(id),
            (Some(_), Some(_)) => {
                return Err(format!("job {} has both expertId and metaExpertId", r.id))
            }
            (None, None) => return Err(format!("job {} has no owner", r.id)),
        };
        Ok(Job {
            id: r.id,
            role: r.role,
            company: r.company,
            description: r.description,
            industry: r.industry,
            location: r.location,
            start_date: r.start_date,
            end_date: r.end_date,
            is_education: r.is_education,
            seniority_level: r.seniority_level,
            owner,
        })
    }
}

impl From<Job> for JobRecord {
    fn from(j: Job) -> Self {
        JobRecord {
            id: j.id,
            role: j.role,
            company: j.company,
            description: j.description,
            industry: j.industry,
            location: j.location,
            start_date: j.start_date,
            end_date: j.end_date,
            is_education: j.is_education,
            seniority_level: j.seniority_level,
            expert_id: j.owner.expert_id(),
            meta_expert_id: j.owner.meta_expert_id(),
        }
    }
}

// =============================================================================
// SENIORITY
// =============================================================================

/// Controlled seniority vocabulary offered to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeniorityLevel {
    Owner,
    Partner,
    CSuite,
    VicePresident,
    Director,
    Manager,
    Senior,
    Entry,
    Trainee,
}

impl SeniorityLevel {
    /// All levels, most senior first.
    pub const ALL: [SeniorityLevel; 9] = [
        SeniorityLevel::Owner,
        SeniorityLevel::Partner,
        SeniorityLevel::CSuite,
        SeniorityLevel::VicePresident,
        SeniorityLevel::Director,
        SeniorityLevel::Manager,
        SeniorityLevel::Senior,
        SeniorityLevel::Entry,
        SeniorityLevel::Trainee,
    ];

    /// Label used in prompts and stored on jobs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeniorityLevel::Owner => "Owner",
            SeniorityLevel::Partner => "Partner",
            SeniorityLevel::CSuite => "C-Suite",
            SeniorityLevel::VicePresident => "Vice-President",
            SeniorityLevel::Director => "Director",
            SeniorityLevel::Manager => "Manager",
            SeniorityLevel::Senior => "Senior",
            SeniorityLevel::Entry => "Entry",
            SeniorityLevel::Trainee => "Trainee",
        }
    }

    /// Exact (case-sensitive) label lookup.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == label)
    }
}

impl fmt::Display for SeniorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// EXPERT TYPES
// =============================================================================

/// One newly observed, unresolved profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub geography: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "linkedInLink", default)]
    pub profile_link: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_picture_link: Option<String>,
    /// Scope (organization/project) bounding candidate matching.
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(rename = "linkedInConnectionCount", default)]
    pub connection_count: Option<u32>,
    /// Set once the expert has been resolved; kept for the audit row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_expert_id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<Job>,
}

impl Expert {
    /// Create an expert with a fresh id and no other data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            profession: None,
            company: None,
            description: None,
            geography: String::new(),
            city: None,
            state: None,
            country: None,
            profile_link: None,
            email: None,
            phone: None,
            profile_picture_link: None,
            organization_id: None,
            connection_count: None,
            meta_expert_id: None,
            jobs: Vec::new(),
        }
    }

    /// Profile link, ignoring empty strings.
    pub fn profile_link(&self) -> Option<&str> {
        non_empty(self.profile_link.as_deref())
    }

    /// Contact email, ignoring empty strings.
    pub fn email(&self) -> Option<&str> {
        non_empty(self.email.as_deref())
    }
}

/// Canonical, deduplicated identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaExpert {
    pub id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profession: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub geography: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "linkedInLink", default)]
    pub profile_link: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_picture_link: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fraud_flag: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strikes: u32,
    #[serde(rename = "linkedInConnectionCount", default)]
    pub connection_count: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<Job>,
}

impl MetaExpert {
    /// Build a new canonical record from a scraped expert.
    ///
    /// Allocates a fresh id, fills the profession/company sentinels when the
    /// expert has none, and moves every job over to the new record.
    pub fn from_expert(expert: &Expert) -> Self {
        let id = Uuid::new_v4();
        let jobs = expert
            .jobs
            .iter()
            .cloned()
            .map(|mut job| {
                job.assign_to_meta_expert(id);
                job
            })
            .collect();

        Self {
            id,
            name: expert.name.clone(),
            organization_id: expert.organization_id.clone(),
            profession: non_empty(expert.profession.as_deref())
                .unwrap_or(defaults::MISSING_PROFESSION)
                .to_string(),
            company: non_empty(expert.company.as_deref())
                .unwrap_or(defaults::MISSING_COMPANY)
                .to_string(),
            description: expert.description.clone(),
            geography: expert.geography.clone(),
            city: expert.city.clone(),
            state: expert.state.clone(),
            country: expert.country.clone(),
            profile_link: expert.profile_link.clone(),
            email: expert.email.clone(),
            phone: expert.phone.clone(),
            profile_picture_link: expert.profile_picture_link.clone(),
            fraud_flag: false,
            strikes: 0,
            connection_count: expert.connection_count,
            jobs,
        }
    }

    /// Profile link, ignoring empty strings.
    pub fn profile_link(&self) -> Option<&str> {
        non_empty(self.profile_link.as_deref())
    }

    /// Contact email, ignoring empty strings.
    pub fn email(&self) -> Option<&str> {
        non_empty(self.email.as_deref())
    }
}

/// Free-text label attached to a meta-expert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub tag: String,
    pub meta_expert_id: Uuid,
}

impl Tag {
    pub fn new(tag: impl Into<String>, meta_expert_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: tag.into(),
            meta_expert_id,
        }
    }
}

// =============================================================================
// COST ACCOUNTING
// =============================================================================

/// Cost of one successful model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRecord {
    pub id: Uuid,
    pub transaction_date: DateTime<Utc>,
    pub model: String,
    pub spend: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_email_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
}

impl SpendRecord {
    /// New record dated now, with no source or test tag.
    pub fn new(model: impl Into<String>, spend: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_date: Utc::now(),
            model: model.into(),
            spend,
            source_email_id: None,
            test_id: None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
