//! Typed request and row shapes for project-request operations.
//!
//! Requests keep the legacy wire field names; row structs decode procedure
//! result sets by their legacy column names.

use chrono::{DateTime, Utc};
use reqtrack_core::gantt::{GanttRow, GanttTask};
use reqtrack_core::transitions::ReviewCondition;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fields accepted when a requester opens a new project request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[serde(rename = "User_Id")]
    pub user_id: i64,
    #[serde(rename = "Role_Id")]
    pub role_id: i32,
    #[serde(rename = "Area_Id")]
    pub area_id: i64,
    #[serde(rename = "Baseline")]
    pub baseline: String,
    #[serde(rename = "Problem_Statement")]
    pub problem_statement: String,
    #[serde(rename = "Scope")]
    pub scope: String,
    #[serde(rename = "Out_Of_Scope")]
    pub out_of_scope: String,
    #[serde(rename = "Impact")]
    pub impact: String,
    #[serde(rename = "Objectives", default)]
    pub objectives: Vec<String>,
    #[serde(rename = "Stakeholders", default)]
    pub stakeholders: Vec<StakeholderAssignment>,
    /// Stored file name produced by the upload handler; only the name is
    /// persisted here.
    #[serde(rename = "File_Current_Process", default)]
    pub current_process_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeholderAssignment {
    #[serde(rename = "User_Id")]
    pub user_id: i64,
}

/// Fields accepted when amending an existing request.
///
/// Stakeholders and objectives are replace-on-present: None leaves the
/// stored set untouched, Some replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
    #[serde(rename = "Project_Id")]
    pub project_id: i64,
    #[serde(rename = "Created_By")]
    pub created_by: i64,
    #[serde(rename = "Status_Id")]
    pub status_id: i32,
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[serde(rename = "Baseline")]
    pub baseline: String,
    #[serde(rename = "Problem_Statement")]
    pub problem_statement: String,
    #[serde(rename = "Scope")]
    pub scope: String,
    #[serde(rename = "Out_Of_Scope")]
    pub out_of_scope: String,
    #[serde(rename = "Impact")]
    pub impact: String,
    #[serde(rename = "File_Current_Process", default)]
    pub current_process_file: Option<String>,
    #[serde(rename = "Objectives", default)]
    pub objectives: Option<Vec<String>>,
    #[serde(rename = "Stakeholders", default)]
    pub stakeholders: Option<Vec<StakeholderAssignment>>,
    #[serde(rename = "Role_Id")]
    pub role_id: i32,
    #[serde(rename = "User_Id")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignMembersRequest {
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
    #[serde(rename = "User_Id")]
    pub user_id: i64,
    #[serde(rename = "User_Role_Id")]
    pub user_role_id: i32,
    #[serde(rename = "Current_Status_Id")]
    pub current_status_id: i32,
    #[serde(rename = "Members")]
    pub members: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPriorityRequest {
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
    #[serde(rename = "Priority_Id")]
    pub priority_id: i64,
    #[serde(rename = "Current_Status_Id")]
    pub current_status_id: i32,
    #[serde(rename = "Role_Id")]
    pub role_id: i32,
    #[serde(rename = "User_Id")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewProjectRequest {
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
    #[serde(rename = "Current_Status_Id")]
    pub current_status_id: i32,
    #[serde(rename = "User_Id")]
    pub user_id: i64,
    #[serde(rename = "Role_Id")]
    pub role_id: i32,
    #[serde(rename = "Condition")]
    pub condition: ReviewCondition,
    #[serde(rename = "Comments", default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGanttRequest {
    #[serde(rename = "User_Id")]
    pub user_id: i64,
    #[serde(rename = "Role_Id")]
    pub role_id: i32,
    #[serde(rename = "Current_Status_Id")]
    pub current_status_id: i32,
    #[serde(rename = "Project_Id")]
    pub project_id: i64,
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
    #[serde(rename = "Gantt_Data")]
    pub tasks: Vec<GanttTask>,
}

/// One row of the project listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectSummary {
    #[sqlx(rename = "Project_Id")]
    #[serde(rename = "Project_Id")]
    pub project_id: i64,
    #[sqlx(rename = "Phase_Id")]
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
    #[sqlx(rename = "Project_Name")]
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[sqlx(rename = "Area_Id")]
    #[serde(rename = "Area_Id")]
    pub area_id: i64,
    #[sqlx(rename = "Status_Id")]
    #[serde(rename = "Status_Id")]
    pub status_id: i32,
    #[sqlx(rename = "Request_Date")]
    #[serde(rename = "Request_Date")]
    pub request_date: DateTime<Utc>,
}

/// Result set 0 of the project-by-id read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectHeader {
    #[sqlx(rename = "Project_Id")]
    #[serde(rename = "Project_Id")]
    pub project_id: i64,
    #[sqlx(rename = "Phase_Id")]
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
    #[sqlx(rename = "Project_Name")]
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[sqlx(rename = "Baseline")]
    #[serde(rename = "Baseline")]
    pub baseline: String,
    #[sqlx(rename = "Problem_Statement")]
    #[serde(rename = "Problem_Statement")]
    pub problem_statement: String,
    #[sqlx(rename = "Scope")]
    #[serde(rename = "Scope")]
    pub scope: String,
    #[sqlx(rename = "Out_Of_Scope")]
    #[serde(rename = "Out_Of_Scope")]
    pub out_of_scope: String,
    #[sqlx(rename = "Impact")]
    #[serde(rename = "Impact")]
    pub impact: String,
    #[sqlx(rename = "File_Path")]
    #[serde(rename = "File_Path")]
    pub file_path: Option<String>,
    #[sqlx(rename = "Area_Id")]
    #[serde(rename = "Area_Id")]
    pub area_id: i64,
    #[sqlx(rename = "Status_Id")]
    #[serde(rename = "Status_Id")]
    pub status_id: i32,
    #[sqlx(rename = "Created_By")]
    #[serde(rename = "Created_By")]
    pub created_by: i64,
    #[sqlx(rename = "Request_Date")]
    #[serde(rename = "Request_Date")]
    pub request_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ObjectiveRow {
    #[sqlx(rename = "Objective_Id")]
    #[serde(rename = "Objective_Id")]
    pub objective_id: i64,
    #[sqlx(rename = "Objective")]
    #[serde(rename = "Objective")]
    pub objective: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMemberRow {
    #[sqlx(rename = "User_Id")]
    #[serde(rename = "User_Id")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StakeholderRow {
    #[sqlx(rename = "User_Id")]
    #[serde(rename = "User_Id")]
    pub user_id: i64,
}

/// Project-by-id read, result sets 0..=3 in their positional order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(rename = "Project")]
    pub project: ProjectHeader,
    #[serde(rename = "Objectives")]
    pub objectives: Vec<ObjectiveRow>,
    #[serde(rename = "Team_Members")]
    pub team_members: Vec<TeamMemberRow>,
    #[serde(rename = "Stakeholders")]
    pub stakeholders: Vec<StakeholderRow>,
}

/// Latest status row of one phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow)]
pub struct PhaseStatus {
    #[sqlx(rename = "Status_Id")]
    #[serde(rename = "Status_Id")]
    pub status_id: i32,
    #[sqlx(rename = "Action_Id")]
    #[serde(rename = "Action_Id")]
    pub action_id: i32,
}

/// Result set 0 of the Gantt read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectInfo {
    #[sqlx(rename = "Project_Id")]
    #[serde(rename = "Project_Id")]
    pub project_id: i64,
    #[sqlx(rename = "Project_Name")]
    #[serde(rename = "Project_Name")]
    pub project_name: String,
}

/// Result set 1 of the Gantt read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GanttInfo {
    #[sqlx(rename = "Phase_Gantt_Id")]
    #[serde(rename = "Phase_Gantt_Id")]
    pub phase_gantt_id: i64,
    #[sqlx(rename = "Phase_Id")]
    #[serde(rename = "Phase_Id")]
    pub phase_id: i64,
}

/// Gantt read as the database hands it back, activities still flat.
#[derive(Debug, Clone)]
pub struct GanttRecord {
    pub project_info: Option<ProjectInfo>,
    pub gantt_info: Option<GanttInfo>,
    pub activities: Vec<GanttRow>,
}

/// Client-facing chart with the activity tree rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GanttChart {
    #[serde(rename = "Project_Info")]
    pub project_info: Option<ProjectInfo>,
    #[serde(rename = "Gantt_Info")]
    pub gantt_info: Option<GanttInfo>,
    #[serde(rename = "Gantt_Activities")]
    pub activities: Vec<GanttTask>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_the_legacy_wire_shape() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "Project_Name": "New intake flow",
            "User_Id": 5,
            "Role_Id": 1,
            "Area_Id": 2,
            "Baseline": "manual intake",
            "Problem_Statement": "slow intake",
            "Scope": "intake",
            "Out_Of_Scope": "billing",
            "Impact": "cycle time",
            "Objectives": ["Reduce cost", "Improve quality"],
            "Stakeholders": [{"User_Id": 5}]
        }))
        .unwrap();
        assert_eq!(req.objectives.len(), 2);
        assert_eq!(req.stakeholders[0].user_id, 5);
        assert!(req.current_process_file.is_none());
    }

    #[test]
    fn update_request_distinguishes_absent_from_empty_collections() {
        let req: UpdateProjectRequest = serde_json::from_value(serde_json::json!({
            "Phase_Id": 9,
            "Project_Id": 3,
            "Created_By": 5,
            "Status_Id": 4,
            "Project_Name": "n",
            "Baseline": "b",
            "Problem_Statement": "p",
            "Scope": "s",
            "Out_Of_Scope": "o",
            "Impact": "i",
            "Objectives": [],
            "Role_Id": 2,
            "User_Id": 5
        }))
        .unwrap();
        assert_eq!(req.objectives, Some(Vec::new()));
        assert!(req.stakeholders.is_none());
    }
}
