//! The stored-procedure catalog.
//!
//! Closed set of database routines this crate calls. The names are part of
//! the wire contract with the database and must not be renamed without a
//! migration; each entry also declares the ordered parameter names its
//! routine expects, checked before any SQL is sent.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    CreateNewProject,
    UpdateProject,
    AssignPhaseStakeholders,
    AssignPhaseObjective,
    GetProjects,
    AssignPhaseMembers,
    GetProjectStatus,
    AssignPriority,
    AddNewStatus,
    GetProjectById,
    DeletePhaseMembers,
    CreateGantt,
    InsertGanttActivities,
    GetGanttByPhase,
    DeleteStakeholdersByPhaseId,
    DeleteObjectivesByPhaseId,
}

impl Procedure {
    /// Routine name as it exists in the database.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateNewProject => "uspPR_Create_New_Project",
            Self::UpdateProject => "uspPR_Update_Project",
            Self::AssignPhaseStakeholders => "uspPR_Assign_Phase_Stakeholders",
            Self::AssignPhaseObjective => "uspPR_Assign_Phase_Objective",
            Self::GetProjects => "uspPR_Get_Projects",
            Self::AssignPhaseMembers => "uspPR_Assign_Phase_Members",
            Self::GetProjectStatus => "uspPR_Get_Project_Status",
            Self::AssignPriority => "uspPR_Assign_Priority",
            Self::AddNewStatus => "uspPR_Add_New_Status",
            Self::GetProjectById => "uspPR_Get_Project_By_Id",
            Self::DeletePhaseMembers => "uspPR_Delete_Phase_Members",
            Self::CreateGantt => "uspPR_Create_Gantt",
            Self::InsertGanttActivities => "uspPR_Insert_Gantt_Activities",
            Self::GetGanttByPhase => "uspPR_Get_Gantt_By_Phase",
            Self::DeleteStakeholdersByPhaseId => "uspPR_Delete_Stakeholders_By_Phase_Id",
            Self::DeleteObjectivesByPhaseId => "uspPR_Delete_Objectives_By_Phase_Id",
        }
    }

    /// Whether the routine hands back its result sets as cursors.
    ///
    /// Routines with one result set return rows directly; the two
    /// multi-set reads return ordered cursors the engine drains.
    pub const fn returns_cursors(self) -> bool {
        matches!(self, Self::GetProjectById | Self::GetGanttByPhase)
    }

    /// Ordered parameter names the routine declares.
    pub const fn params(self) -> &'static [&'static str] {
        match self {
            Self::CreateNewProject => &[
                "Project_Name",
                "Client_Id",
                "Area_Id",
                "Baseline",
                "Problem_Statement",
                "Scope",
                "Out_Of_Scope",
                "Impact",
                "File_Path",
            ],
            Self::UpdateProject => &[
                "Phase_Id",
                "Project_Id",
                "Project_Name",
                "Baseline",
                "Problem_Statement",
                "Scope",
                "Out_Of_Scope",
                "Impact",
                "File_Path",
            ],
            Self::AssignPhaseStakeholders => &["User_Id", "Phase_Id"],
            Self::AssignPhaseObjective => &["Phase_Id", "Objective"],
            Self::GetProjects => &[],
            Self::AssignPhaseMembers => &["User_Id", "Phase_Id"],
            Self::GetProjectStatus => &["Phase_Id"],
            Self::AssignPriority => &["Phase_Id", "Priority_Id"],
            Self::AddNewStatus => &[
                "Phase_Id",
                "New_Status_Id",
                "New_Action_Id",
                "Reason_For_Rejection",
                "Reviewed_By",
            ],
            // Legacy casing differs here; the database declares these three
            // camelCase.
            Self::GetProjectById => &["phaseId", "projectId", "reviewHistoryId"],
            Self::DeletePhaseMembers => &["Phase_Id"],
            Self::CreateGantt => &["Phase_Id"],
            Self::InsertGanttActivities => &[
                "TaskID",
                "TaskName",
                "StartDate",
                "EndDate",
                "Duration",
                "Progress",
                "Predecessor",
                "ParentTaskId",
                "Phase_Gantt_Id",
            ],
            Self::GetGanttByPhase => &["Phase_Id", "Project_Id", "Review_History_Id"],
            Self::DeleteStakeholdersByPhaseId => &["Phase_Id"],
            Self::DeleteObjectivesByPhaseId => &["Phase_Id"],
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_the_wire_contract() {
        assert_eq!(Procedure::CreateNewProject.name(), "uspPR_Create_New_Project");
        assert_eq!(Procedure::AssignPhaseObjective.name(), "uspPR_Assign_Phase_Objective");
        assert_eq!(Procedure::GetGanttByPhase.name(), "uspPR_Get_Gantt_By_Phase");
        assert_eq!(
            Procedure::DeleteObjectivesByPhaseId.name(),
            "uspPR_Delete_Objectives_By_Phase_Id"
        );
    }

    #[test]
    fn only_the_multi_set_reads_use_cursors() {
        assert!(Procedure::GetProjectById.returns_cursors());
        assert!(Procedure::GetGanttByPhase.returns_cursors());
        assert!(!Procedure::GetProjects.returns_cursors());
        assert!(!Procedure::CreateNewProject.returns_cursors());
    }

    #[test]
    fn parameter_shapes_are_stable() {
        assert_eq!(Procedure::GetProjects.params().len(), 0);
        assert_eq!(Procedure::AssignPhaseStakeholders.params(), &["User_Id", "Phase_Id"]);
        assert_eq!(
            Procedure::GetProjectById.params(),
            &["phaseId", "projectId", "reviewHistoryId"]
        );
        assert_eq!(Procedure::InsertGanttActivities.params().len(), 9);
        assert_eq!(Procedure::AddNewStatus.params()[3], "Reason_For_Rejection");
    }
}
