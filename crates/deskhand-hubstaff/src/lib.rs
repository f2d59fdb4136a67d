// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hubstaff time tracker adapter for Deskhand.
//!
//! Builds the per-member report from the v2 daily activities endpoint,
//! with member names and team membership looked up per organization.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use deskhand_config::model::HubstaffConfig;
use deskhand_core::types::{AdapterType, HealthStatus, MemberActivity, Organization};
use deskhand_core::{DeskhandError, PluginAdapter, TimeTracker};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct Pagination {
    next_page_start_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DailyActivity {
    user_id: i64,
    #[serde(default)]
    tracked: i64,
}

#[derive(Debug, Deserialize)]
struct DailyActivities {
    #[serde(default)]
    daily_activities: Vec<DailyActivity>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Named {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationBody {
    organization: Named,
}

#[derive(Debug, Deserialize)]
struct UsersBody {
    #[serde(default)]
    users: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct TeamsBody {
    #[serde(default)]
    teams: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct TeamMember {
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct TeamMembersBody {
    #[serde(default)]
    members: Vec<TeamMember>,
}

/// Time tracker backed by the Hubstaff v2 API.
pub struct HubstaffTracker {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubstaffTracker {
    pub fn new(config: &HubstaffConfig) -> Result<Self, DeskhandError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DeskhandError::internal("hubstaff.token is not configured"))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DeskhandError::with_source("failed to build hubstaff HTTP client", e))?;
        info!(base_url = %config.base_url, "hubstaff adapter initialized");
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DeskhandError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .map_err(|e| DeskhandError::with_source(format!("hubstaff {path} failed"), e))?;
        let status = response.status();
        debug!(path, status = %status, "hubstaff response received");

        if status == StatusCode::NOT_FOUND {
            return Err(DeskhandError::not_found(format!("hubstaff {path}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeskhandError::internal(format!(
                "hubstaff {path} returned {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| DeskhandError::with_source(format!("failed to decode hubstaff {path}"), e))
    }

    /// Tracked seconds per user, summed over the date range.
    async fn tracked_by_user(
        &self,
        org_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<i64, i64>, DeskhandError> {
        let path = format!("/organizations/{org_id}/activities/daily");
        let mut totals = BTreeMap::new();
        let mut page_start: Option<i64> = None;
        loop {
            let mut query = vec![
                ("date[start]", start.to_string()),
                ("date[stop]", end.to_string()),
            ];
            if let Some(id) = page_start.take() {
                query.push(("page_start_id", id.to_string()));
            }
            let page: DailyActivities = self.get(&path, &query).await?;
            for day in page.daily_activities {
                *totals.entry(day.user_id).or_insert(0) += day.tracked;
            }
            match page.pagination.and_then(|p| p.next_page_start_id) {
                Some(next) => page_start = Some(next),
                None => return Ok(totals),
            }
        }
    }

    async fn team_of_user(&self, org_id: i64) -> Result<HashMap<i64, String>, DeskhandError> {
        let teams: TeamsBody = self
            .get(&format!("/organizations/{org_id}/teams"), &[])
            .await?;
        let mut by_user = HashMap::new();
        for team in teams.teams {
            let members: TeamMembersBody =
                self.get(&format!("/teams/{}/members", team.id), &[]).await?;
            for member in members.members {
                by_user.entry(member.user_id).or_insert_with(|| team.name.clone());
            }
        }
        Ok(by_user)
    }
}

#[async_trait]
impl PluginAdapter for HubstaffTracker {
    fn name(&self) -> &str {
        "hubstaff"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TimeTracker
    }

    async fn health_check(&self) -> Result<HealthStatus, DeskhandError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), DeskhandError> {
        debug!("hubstaff adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl TimeTracker for HubstaffTracker {
    async fn report_by_member_and_team(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        org_id: i64,
    ) -> Result<Vec<Organization>, DeskhandError> {
        let org: OrganizationBody = self.get(&format!("/organizations/{org_id}"), &[]).await?;
        let tracked = self.tracked_by_user(org_id, start, end).await?;
        let users: UsersBody = self
            .get(&format!("/organizations/{org_id}/members"), &[("include", "users".to_string())])
            .await?;
        let names: HashMap<i64, String> = users.users.into_iter().map(|u| (u.id, u.name)).collect();
        let teams = self.team_of_user(org_id).await?;

        let members = tracked
            .into_iter()
            .map(|(user_id, seconds)| MemberActivity {
                user_id,
                name: names.get(&user_id).cloned().unwrap_or_else(|| user_id.to_string()),
                team: teams.get(&user_id).cloned(),
                tracked_seconds: seconds,
            })
            .collect();

        Ok(vec![Organization {
            id: org.organization.id,
            name: org.organization.name,
            members,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tracker(server: &MockServer) -> HubstaffTracker {
        HubstaffTracker::new(&HubstaffConfig {
            base_url: server.uri(),
            token: Some("pat".into()),
            org_id: 7,
        })
        .unwrap()
    }

    #[test]
    fn token_is_required() {
        assert!(HubstaffTracker::new(&HubstaffConfig::default()).is_err());
    }

    #[tokio::test]
    async fn report_sums_days_and_attaches_names_and_teams() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/organizations/7"))
            .and(header("authorization", "Bearer pat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organization": {"id": 7, "name": "Acme"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/organizations/7/activities/daily"))
            .and(query_param("page_start_id", "99"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily_activities": [{"user_id": 1, "tracked": 600}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/organizations/7/activities/daily"))
            .and(query_param("date[start]", "2026-10-18"))
            .and(query_param("date[stop]", "2026-10-18"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily_activities": [
                    {"user_id": 1, "tracked": 3600},
                    {"user_id": 2, "tracked": 7200}
                ],
                "pagination": {"next_page_start_id": 99}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/organizations/7/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "members": [{"user_id": 1}, {"user_id": 2}],
                "users": [{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bo"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/organizations/7/teams"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "teams": [{"id": 30, "name": "Backend"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/teams/30/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "members": [{"user_id": 2}]
            })))
            .mount(&server)
            .await;

        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let orgs = tracker(&server).report_by_member_and_team(day, day, 7).await.unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].name, "Acme");
        let members = &orgs[0].members;
        assert_eq!(members.len(), 2);
        assert_eq!((members[0].name.as_str(), members[0].tracked_seconds), ("Ann", 4200));
        assert_eq!(members[0].team, None);
        assert_eq!(members[1].team.as_deref(), Some("Backend"));
    }

    #[tokio::test]
    async fn unknown_organization_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let err = tracker(&server)
            .report_by_member_and_team(day, day, 7)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
