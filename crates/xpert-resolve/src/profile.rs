//! Conversion of provider person records into [`Expert`]s.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

use xpert_core::{defaults, Error, Expert, Job, Result};

/// Date with any of its parts possibly missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PartialDate {
    #[serde(default)]
    pub day: Option<u32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl PartialDate {
    /// Midnight UTC, with missing month/day taken as 1. Needs a year.
    pub fn as_start(&self) -> Option<DateTime<Utc>> {
        let year = self.year?;
        ymd(year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }

    /// Midnight UTC, only when year, month and day are all known.
    pub fn as_end(&self) -> Option<DateTime<Utc>> {
        ymd(self.year?, self.month?, self.day?)
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderExperience {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub starts_at: Option<PartialDate>,
    #[serde(default)]
    pub ends_at: Option<PartialDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderEducation {
    #[serde(default)]
    pub degree_name: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub starts_at: Option<PartialDate>,
    #[serde(default)]
    pub ends_at: Option<PartialDate>,
}

/// Person record as returned by the profile data provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderProfile {
    /// Public profile URL the record was fetched for.
    #[serde(default, alias = "linkedin_profile_url")]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Usually "Role at Company".
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub connections: Option<u32>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
    #[serde(default)]
    pub personal_emails: Option<Vec<String>>,
    #[serde(default)]
    pub experiences: Option<Vec<ProviderExperience>>,
    #[serde(default)]
    pub education: Option<Vec<ProviderEducation>>,
}

/// Canonicalize a profile URL, rejecting anything that is not a LinkedIn link.
pub fn normalize_profile_url(url: &str) -> Result<String> {
    let url = url.trim();
    if !url.to_ascii_lowercase().contains("linkedin") {
        return Err(Error::InvalidInput(format!("not a LinkedIn profile URL: {}", url)));
    }

    let lower = url.to_ascii_lowercase();
    if lower.starts_with("lin") {
        Ok(format!("https://www.{}", url))
    } else if lower.starts_with("www.") {
        Ok(format!("https://{}", url))
    } else {
        Ok(url.to_string())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Split "Role at Company"; without " at " the whole text is the role.
fn split_occupation(occupation: Option<String>) -> (Option<String>, Option<String>) {
    let Some(occupation) = non_blank(occupation) else {
        return (None, None);
    };
    match occupation.split_once(" at ") {
        Some((role, company)) => (non_blank(Some(role.into())), non_blank(Some(company.into()))),
        None => (Some(occupation), None),
    }
}

impl ProviderProfile {
    /// Build an unresolved expert from this record.
    ///
    /// Jobs are owned by the new expert. `organization_id` sets the match
    /// scope.
    pub fn into_expert(self, organization_id: Option<String>) -> Result<Expert> {
        let profile_link = match non_blank(self.profile_url) {
            Some(url) => Some(normalize_profile_url(&url)?),
            None => None,
        };

        let mut expert = Expert::new(non_blank(self.full_name).unwrap_or_default());
        let expert_id = expert.id;

        let (profession, company) = split_occupation(self.occupation);
        expert.profession = profession;
        expert.company = company;
        expert.description = non_blank(self.headline);

        expert.city = non_blank(self.city);
        expert.state = non_blank(self.state);
        expert.country = non_blank(self.country);
        expert.geography = [&expert.city, &expert.state, &expert.country]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        expert.profile_link = profile_link;
        expert.email = self
            .personal_emails
            .unwrap_or_default()
            .into_iter()
            .find_map(|e| non_blank(Some(e)));
        expert.profile_picture_link = non_blank(self.profile_pic_url);
        expert.organization_id = organization_id;
        expert.connection_count = self
            .connections
            .filter(|c| *c < defaults::LOW_CONNECTION_THRESHOLD);

        let experiences = self.experiences.unwrap_or_default();
        let education = self.education.unwrap_or_default();

        let mut jobs = Vec::with_capacity(experiences.len() + education.len());
        for exp in experiences {
            let job = experience_job(expert_id, exp);
            if expert.company.is_none() && job.end_date.is_some() {
                expert.company = job.company.clone();
            }
            jobs.push(job);
        }
        jobs.extend(education.into_iter().map(|edu| education_job(expert_id, edu)));
        expert.jobs = jobs;

        Ok(expert)
    }
}

fn experience_job(expert_id: Uuid, exp: ProviderExperience) -> Job {
    let mut job = Job::for_expert(expert_id);
    job.role = non_blank(exp.title);
    job.company = non_blank(exp.company);
    job.industry = non_blank(exp.industry);
    job.description = non_blank(exp.description);
    job.location = non_blank(exp.location);
    job.start_date = exp.starts_at.and_then(|d| d.as_start());
    job.end_date = exp.ends_at.and_then(|d| d.as_end());
    job
}

fn education_job(expert_id: Uuid, edu: ProviderEducation) -> Job {
    let mut job = Job::for_expert(expert_id);
    job.role = non_blank(edu.degree_name);
    job.company = non_blank(edu.school);
    job.description = non_blank(edu.field_of_study);
    job.location = non_blank(edu.location);
    job.start_date = edu.starts_at.and_then(|d| d.as_start());
    job.end_date = edu.ends_at.and_then(|d| d.as_end());
    job.is_education = true;
    job
}
