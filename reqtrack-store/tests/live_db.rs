//! End-to-end checks against a live PostgreSQL database.
//!
//! These create throwaway tables and routines with the production catalog
//! names, so point DATABASE_URL at a scratch database and run them
//! single-threaded (the shared schema setup is not concurrency safe):
//!
//!   DATABASE_URL=postgres://localhost/reqtrack_test \
//!     cargo test -p reqtrack-store -- --ignored --test-threads=1

use std::sync::Arc;

use async_trait::async_trait;
use reqtrack_core::transitions::{
    actions, StatusTransition, TransitionRule, TransitionTable, PROJECT_DOMAIN,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use reqtrack_store::config::{DbConfig, DbTarget, PROJECT_REQUEST_POOL};
use reqtrack_store::projects::models::{
    AssignMembersRequest, CreateProjectRequest, StakeholderAssignment,
};
use reqtrack_store::{
    Executor, PgProjectsDao, PoolConnector, PoolRegistry, ProcParam, Procedure, ProjectsDao,
    ProjectsService, StoreError,
};

/// Connects by DATABASE_URL regardless of the configured target.
struct UrlConnector {
    url: String,
}

#[async_trait]
impl PoolConnector for UrlConnector {
    async fn connect(&self, _target: &DbTarget) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new().max_connections(5).connect(&self.url).await
    }
}

fn executor() -> Executor {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let config = DbConfig::new(vec![DbTarget::authenticated(
        PROJECT_REQUEST_POOL,
        "ignored",
        5432,
        "ignored",
        "ignored",
        "ignored",
    )]);
    let registry = PoolRegistry::with_connector(config, Arc::new(UrlConnector { url }));
    Executor::new(Arc::new(registry))
}

async fn setup_schema(executor: &Executor) {
    let statements = [
        "CREATE SEQUENCE IF NOT EXISTS pr_phase_seq",
        r#"CREATE TABLE IF NOT EXISTS pr_projects (
            "Phase_Id" bigint PRIMARY KEY,
            "Project_Name" text NOT NULL,
            "Client_Id" bigint NOT NULL,
            "File_Path" text
        )"#,
        r#"CREATE TABLE IF NOT EXISTS pr_stakeholders (
            "Phase_Id" bigint NOT NULL,
            "User_Id" bigint NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS pr_objectives (
            "Phase_Id" bigint NOT NULL,
            "Objective" text NOT NULL
        )"#,
        r#"CREATE OR REPLACE FUNCTION "uspPR_Create_New_Project"(
            p_name text, p_client bigint, p_area bigint, p_baseline text,
            p_problem text, p_scope text, p_out text, p_impact text, p_file text)
        RETURNS TABLE("Phase_Id" bigint) AS $$
        DECLARE new_phase bigint;
        BEGIN
            new_phase := nextval('pr_phase_seq');
            INSERT INTO pr_projects("Phase_Id", "Project_Name", "Client_Id", "File_Path")
            VALUES (new_phase, p_name, p_client, p_file);
            RETURN QUERY SELECT new_phase;
        END;
        $$ LANGUAGE plpgsql"#,
        r#"CREATE OR REPLACE FUNCTION "uspPR_Assign_Phase_Stakeholders"(
            p_user bigint, p_phase bigint)
        RETURNS void AS $$
            INSERT INTO pr_stakeholders("Phase_Id", "User_Id") VALUES (p_phase, p_user);
        $$ LANGUAGE sql"#,
        r#"CREATE OR REPLACE FUNCTION "uspPR_Assign_Phase_Objective"(
            p_phase bigint, p_objective text)
        RETURNS void AS $$
        BEGIN
            IF p_objective = 'boom' THEN
                RAISE EXCEPTION 'forced failure';
            END IF;
            INSERT INTO pr_objectives("Phase_Id", "Objective") VALUES (p_phase, p_objective);
        END;
        $$ LANGUAGE plpgsql"#,
        r#"CREATE TABLE IF NOT EXISTS pr_members (
            "Phase_Id" bigint NOT NULL,
            "User_Id" bigint NOT NULL
        )"#,
        r#"CREATE TABLE IF NOT EXISTS pr_status_history (
            "Phase_Id" bigint NOT NULL,
            "Status_Id" int NOT NULL,
            "Action_Id" int NOT NULL,
            "Reason_For_Rejection" text,
            "Reviewed_By" bigint NOT NULL
        )"#,
        r#"CREATE OR REPLACE FUNCTION "uspPR_Delete_Phase_Members"(p_phase bigint)
        RETURNS void AS $$
            DELETE FROM pr_members WHERE "Phase_Id" = p_phase;
        $$ LANGUAGE sql"#,
        r#"CREATE OR REPLACE FUNCTION "uspPR_Assign_Phase_Members"(
            p_user bigint, p_phase bigint)
        RETURNS void AS $$
            INSERT INTO pr_members("Phase_Id", "User_Id") VALUES (p_phase, p_user);
        $$ LANGUAGE sql"#,
        r#"CREATE OR REPLACE FUNCTION "uspPR_Add_New_Status"(
            p_phase bigint, p_status int, p_action int, p_reason text, p_reviewer bigint)
        RETURNS void AS $$
            INSERT INTO pr_status_history("Phase_Id", "Status_Id", "Action_Id",
                                          "Reason_For_Rejection", "Reviewed_By")
            VALUES (p_phase, p_status, p_action, p_reason, p_reviewer);
        $$ LANGUAGE sql"#,
        r#"CREATE OR REPLACE FUNCTION "uspPR_Get_Gantt_By_Phase"(
            p_phase bigint, p_project bigint, p_review bigint)
        RETURNS SETOF refcursor AS $$
        DECLARE
            c_project refcursor := 'pr_gantt_project';
            c_header refcursor := 'pr_gantt_header';
            c_rows refcursor := 'pr_gantt_rows';
        BEGIN
            OPEN c_project FOR
                SELECT p_project AS "Project_Id", 'demo project'::text AS "Project_Name";
            RETURN NEXT c_project;
            OPEN c_header FOR
                SELECT 77::bigint AS "Phase_Gantt_Id", p_phase AS "Phase_Id";
            RETURN NEXT c_header;
            OPEN c_rows FOR
                SELECT 1::bigint AS "TaskID", 'kickoff'::text AS "TaskName",
                       now() AS "StartDate", now() AS "EndDate",
                       1.5::float8 AS "Duration", 0.5::float8 AS "Progress",
                       NULL::text AS "Predecessor", NULL::bigint AS "ParentTaskId";
            RETURN NEXT c_rows;
        END;
        $$ LANGUAGE plpgsql"#,
    ];
    for statement in statements {
        executor
            .query(PROJECT_REQUEST_POOL, "schema setup", statement)
            .await
            .expect("schema setup failed");
    }
}

async fn next_phase_id(executor: &Executor) -> i64 {
    let rows = executor
        .query(
            PROJECT_REQUEST_POOL,
            "next phase id",
            "SELECT nextval('pr_phase_seq')::bigint AS n",
        )
        .await
        .expect("nextval failed");
    rows[0].get("n")
}

async fn count_objectives(executor: &Executor, phase_id: i64) -> i64 {
    let rows = executor
        .query(
            PROJECT_REQUEST_POOL,
            "count objectives",
            &format!(r#"SELECT count(*)::bigint AS n FROM pr_objectives WHERE "Phase_Id" = {phase_id}"#),
        )
        .await
        .expect("count failed");
    rows[0].get("n")
}

#[tokio::test]
#[ignore = "requires database"]
async fn pool_acquires_connection() {
    let executor = executor();
    let rows = executor
        .query(PROJECT_REQUEST_POOL, "connectivity probe", "SELECT 1 AS one")
        .await
        .expect("query failed");
    let one: i32 = rows[0].get("one");
    assert_eq!(one, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn transact_with_no_batches_is_a_noop_success() {
    let executor = executor();
    setup_schema(&executor).await;
    executor
        .transact(PROJECT_REQUEST_POOL, Procedure::AssignPhaseObjective, &[])
        .await
        .expect("empty transaction should commit trivially");
}

#[tokio::test]
#[ignore = "requires database"]
async fn failing_batch_rolls_back_the_whole_transaction() {
    let executor = executor();
    setup_schema(&executor).await;
    let phase_id = next_phase_id(&executor).await;

    let batch = |objective: &str| {
        vec![
            ProcParam::input("Phase_Id", phase_id),
            ProcParam::input("Objective", objective),
        ]
    };
    let err = executor
        .transact(
            PROJECT_REQUEST_POOL,
            Procedure::AssignPhaseObjective,
            &[batch("first"), batch("boom"), batch("third")],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::TransactionFailed { .. }), "{err}");
    assert_eq!(count_objectives(&executor, phase_id).await, 0);

    // The same batches minus the poison pill commit atomically.
    executor
        .transact(
            PROJECT_REQUEST_POOL,
            Procedure::AssignPhaseObjective,
            &[batch("first"), batch("third")],
        )
        .await
        .expect("clean batches should commit");
    assert_eq!(count_objectives(&executor, phase_id).await, 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn multi_set_read_drains_cursors_in_return_order() {
    let executor = executor();
    setup_schema(&executor).await;

    let dao = PgProjectsDao::new(executor);
    let record = dao.get_gantt(9, 3, 0).await.expect("gantt read failed");

    let project = record.project_info.expect("project info set");
    assert_eq!(project.project_id, 3);
    let header = record.gantt_info.expect("gantt header set");
    assert_eq!(header.phase_gantt_id, 77);
    assert_eq!(header.phase_id, 9);
    assert_eq!(record.activities.len(), 1);
    assert_eq!(record.activities[0].task_name, "kickoff");
    assert_eq!(record.activities[0].parent_task_id, None);
}

#[tokio::test]
#[ignore = "requires database"]
async fn create_project_persists_children_end_to_end() {
    let executor = executor();
    setup_schema(&executor).await;

    let service = ProjectsService::new(
        PgProjectsDao::new(executor.clone()),
        TransitionTable::default(),
    );
    let req = CreateProjectRequest {
        project_name: "Intake overhaul".into(),
        user_id: 5,
        role_id: 1,
        area_id: 2,
        baseline: "manual intake".into(),
        problem_statement: "slow intake".into(),
        scope: "intake".into(),
        out_of_scope: "billing".into(),
        impact: "cycle time".into(),
        objectives: vec!["Reduce cost".into(), "Improve quality".into()],
        stakeholders: vec![StakeholderAssignment { user_id: 5 }],
        current_process_file: Some("process-a1.pdf".into()),
    };

    let phase_id = service.create_project(&req).await.expect("create failed");

    assert_eq!(count_objectives(&executor, phase_id).await, 2);
    let rows = executor
        .query(
            PROJECT_REQUEST_POOL,
            "count stakeholders",
            &format!(
                r#"SELECT count(*)::bigint AS n FROM pr_stakeholders WHERE "Phase_Id" = {phase_id}"#
            ),
        )
        .await
        .expect("count failed");
    let stakeholders: i64 = rows[0].get("n");
    assert_eq!(stakeholders, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn assign_members_replaces_the_set_and_records_one_status() {
    let executor = executor();
    setup_schema(&executor).await;
    let phase_id = next_phase_id(&executor).await;

    // Pre-existing member that the assignment must replace.
    executor
        .query(
            PROJECT_REQUEST_POOL,
            "seed member",
            &format!(r#"INSERT INTO pr_members("Phase_Id", "User_Id") VALUES ({phase_id}, 999)"#),
        )
        .await
        .expect("seed failed");

    let rules = TransitionTable::new(
        vec![TransitionRule {
            domain: PROJECT_DOMAIN.to_string(),
            action: actions::ASSIGN_MEMBERS,
            current_status: 2,
            role: 3,
            next: StatusTransition { status: 3, action: 2 },
        }],
        Vec::new(),
    );
    let service = ProjectsService::new(PgProjectsDao::new(executor.clone()), rules);

    service
        .assign_members(&AssignMembersRequest {
            phase_id,
            user_id: 7,
            user_role_id: 3,
            current_status_id: 2,
            members: vec![11, 12],
        })
        .await
        .expect("assign failed");

    let rows = executor
        .query(
            PROJECT_REQUEST_POOL,
            "read members",
            &format!(
                r#"SELECT "User_Id" FROM pr_members WHERE "Phase_Id" = {phase_id} ORDER BY "User_Id""#
            ),
        )
        .await
        .expect("read failed");
    let members: Vec<i64> = rows.iter().map(|r| r.get("User_Id")).collect();
    assert_eq!(members, vec![11, 12]);

    let rows = executor
        .query(
            PROJECT_REQUEST_POOL,
            "read status history",
            &format!(
                r#"SELECT "Status_Id", "Action_Id" FROM pr_status_history WHERE "Phase_Id" = {phase_id}"#
            ),
        )
        .await
        .expect("read failed");
    assert_eq!(rows.len(), 1);
    let status: i32 = rows[0].get("Status_Id");
    let action: i32 = rows[0].get("Action_Id");
    assert_eq!((status, action), (3, 2));
}
