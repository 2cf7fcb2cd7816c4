use chrono::NaiveDate;
use portfolio_core::{
    due_today, list_tasks, search_projects, seed_store, TaskListQuery, TaskPerspective,
};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn ids<'a>(tasks: &[&'a portfolio_core::Task]) -> Vec<&'a str> {
    tasks.iter().map(|task| task.id.as_str()).collect()
}

#[test]
fn all_tasks_are_sorted_by_due_date() {
    let store = seed_store();
    let tasks = list_tasks(store.tasks(), &TaskListQuery::default(), date("2024-06-01"));
    assert_eq!(ids(&tasks), vec!["t1", "t4", "t3", "t5", "t2", "t6"]);
}

#[test]
fn search_matches_title_or_assignee_case_insensitively() {
    let store = seed_store();
    let query = TaskListQuery {
        search: Some("BOB".to_string()),
        ..TaskListQuery::default()
    };
    let tasks = list_tasks(store.tasks(), &query, date("2024-06-01"));
    assert_eq!(ids(&tasks), vec!["t5", "t2", "t6"]);

    let query = TaskListQuery {
        search: Some("config".to_string()),
        ..TaskListQuery::default()
    };
    assert_eq!(ids(&list_tasks(store.tasks(), &query, date("2024-06-01"))), vec!["t3"]);
}

#[test]
fn perspectives_filter_by_state() {
    let store = seed_store();
    let today = date("2024-06-01");
    let with = |perspective| TaskListQuery {
        perspective,
        ..TaskListQuery::default()
    };

    let active = list_tasks(store.tasks(), &with(TaskPerspective::Active), today);
    assert_eq!(ids(&active), vec!["t3", "t5", "t2", "t6"]);

    let blocked = list_tasks(store.tasks(), &with(TaskPerspective::Blocked), today);
    assert_eq!(ids(&blocked), vec!["t3"]);

    let overdue = list_tasks(store.tasks(), &with(TaskPerspective::Overdue), today);
    assert_eq!(ids(&overdue), vec!["t3", "t5", "t2"]);
}

#[test]
fn project_filter_combines_with_perspective() {
    let store = seed_store();
    let query = TaskListQuery {
        perspective: TaskPerspective::Active,
        project_id: Some("p2".to_string()),
        ..TaskListQuery::default()
    };
    let tasks = list_tasks(store.tasks(), &query, date("2024-06-01"));
    assert_eq!(ids(&tasks), vec!["t5", "t6"]);
}

#[test]
fn due_today_includes_earlier_open_tasks() {
    let store = seed_store();
    assert_eq!(ids(&due_today(store.tasks(), date("2024-05-22"))), vec!["t3", "t5"]);
    assert!(due_today(store.tasks(), date("2024-05-01")).is_empty());
}

#[test]
fn project_search_checks_name_and_description() {
    let store = seed_store();
    let by_name: Vec<&str> = search_projects(store.projects(), "security")
        .into_iter()
        .map(|project| project.id.as_str())
        .collect();
    assert_eq!(by_name, vec!["p3"]);

    let by_description: Vec<&str> = search_projects(store.projects(), "aws")
        .into_iter()
        .map(|project| project.id.as_str())
        .collect();
    assert_eq!(by_description, vec!["p1"]);

    assert_eq!(search_projects(store.projects(), "").len(), 4);
}

#[test]
fn related_risks_and_decisions_are_resolved() {
    let store = seed_store();
    assert_eq!(store.risks_for_task("t3").len(), 1);
    assert_eq!(store.risks_for_project("p2")[0].id, "r1");
    assert_eq!(store.decisions_for_task("t2")[0].id, "d1");
    assert_eq!(store.decisions_for_project("p2")[0].id, "d2");
    assert!(store.decisions_for_project("p4").is_empty());
}
