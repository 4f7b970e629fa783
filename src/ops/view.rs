use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::model::project::ProjectSelection;
use crate::model::task::Task;

/// Transient filter and sort settings for the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub project: ProjectSelection,
    /// Case-insensitive substring; empty matches everything
    pub search: String,
    /// Only tasks due on the current local date
    pub due_today: bool,
    /// Dated tasks first, earliest due date first
    pub sort_by_due: bool,
}

impl ViewFilter {
    /// Whether a task passes the project, due-today and search filters
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if !self.project.includes(&task.project_id) {
            return false;
        }
        if self.due_today && task.due_date != Some(today) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        task.matches_lowercase(&self.search.to_lowercase())
    }
}

/// Derive the displayed task list from the document.
///
/// Never reorders the document itself; the result borrows from `tasks`.
pub fn project_view<'a>(tasks: &'a [Task], filter: &ViewFilter, today: NaiveDate) -> Vec<&'a Task> {
    let mut view: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t, today)).collect();
    // sort_by is stable, so equal keys keep document order
    view.sort_by(|a, b| compare_tasks(a, b, filter.sort_by_due));
    view
}

/// Display ordering: open before done, starred before unstarred, then
/// (optionally) by due date, then oldest first.
pub fn compare_tasks(a: &Task, b: &Task, sort_by_due: bool) -> Ordering {
    a.done
        .cmp(&b.done)
        .then_with(|| b.starred.cmp(&a.starred))
        .then_with(|| {
            if sort_by_due {
                compare_due(a.due_date, b.due_date)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.created_at.cmp(&b.created_at))
}

fn compare_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Due strictly before today and still open.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.done && task.due_date.is_some_and(|due| due < today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn task(id: &str, minute: u32) -> Task {
        Task::new(id, format!("task {}", id), at(minute))
    }

    fn ids(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn incomplete_before_complete_regardless_of_star() {
        let a = task("1", 1);
        let mut b = task("2", 2);
        b.done = true;
        b.starred = true;
        let tasks = vec![a, b];
        let view = project_view(&tasks, &ViewFilter::default(), day(1));
        assert_eq!(ids(&view), vec!["1", "2"]);
    }

    #[test]
    fn starred_before_unstarred_among_open() {
        let a = task("1", 1);
        let mut b = task("2", 2);
        b.starred = true;
        let tasks = vec![a, b];
        let view = project_view(&tasks, &ViewFilter::default(), day(1));
        assert_eq!(ids(&view), vec!["2", "1"]);
    }

    #[test]
    fn created_at_breaks_ties() {
        let tasks = vec![task("late", 30), task("early", 5), task("mid", 10)];
        let view = project_view(&tasks, &ViewFilter::default(), day(1));
        assert_eq!(ids(&view), vec!["early", "mid", "late"]);
    }

    #[test]
    fn due_sort_puts_dated_first_and_earliest_first() {
        let undated = task("undated", 1);
        let mut later = task("later", 2);
        later.due_date = Some(day(9));
        let mut sooner = task("sooner", 3);
        sooner.due_date = Some(day(4));
        let tasks = vec![undated, later, sooner];

        let filter = ViewFilter {
            sort_by_due: true,
            ..Default::default()
        };
        let view = project_view(&tasks, &filter, day(1));
        assert_eq!(ids(&view), vec!["sooner", "later", "undated"]);

        // Without the toggle, creation order wins
        let view = project_view(&tasks, &ViewFilter::default(), day(1));
        assert_eq!(ids(&view), vec!["undated", "later", "sooner"]);
    }

    #[test]
    fn star_outranks_due_date() {
        let mut starred = task("starred", 1);
        starred.starred = true;
        let mut dated = task("dated", 2);
        dated.due_date = Some(day(2));
        let tasks = vec![dated, starred];
        let filter = ViewFilter {
            sort_by_due: true,
            ..Default::default()
        };
        let view = project_view(&tasks, &filter, day(1));
        assert_eq!(ids(&view), vec!["starred", "dated"]);
    }

    #[test]
    fn equal_keys_keep_document_order() {
        let tasks = vec![task("b", 1), task("a", 1), task("c", 1)];
        let view = project_view(&tasks, &ViewFilter::default(), day(1));
        assert_eq!(ids(&view), vec!["b", "a", "c"]);
    }

    fn permutations(items: Vec<Task>) -> Vec<Vec<Task>> {
        if items.len() <= 1 {
            return vec![items];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.clone();
            let head = rest.remove(i);
            for mut tail in permutations(rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    fn mixed_tasks() -> Vec<Task> {
        let mut done_starred = task("done-starred", 1);
        done_starred.done = true;
        done_starred.starred = true;
        let mut starred = task("starred", 5);
        starred.starred = true;
        let mut due_late = task("due-late", 2);
        due_late.due_date = Some(day(9));
        let mut due_soon = task("due-soon", 4);
        due_soon.due_date = Some(day(3));
        let plain = task("plain", 3);
        vec![done_starred, starred, due_late, due_soon, plain]
    }

    #[test]
    fn order_is_the_same_for_every_input_permutation() {
        for sort_by_due in [false, true] {
            let filter = ViewFilter {
                sort_by_due,
                ..Default::default()
            };
            let mut expected: Option<Vec<String>> = None;
            for tasks in permutations(mixed_tasks()) {
                let view = project_view(&tasks, &filter, day(1));
                for pair in view.windows(2) {
                    assert_ne!(
                        compare_tasks(pair[0], pair[1], sort_by_due),
                        Ordering::Greater
                    );
                }
                let got = ids(&view);
                match &expected {
                    Some(first) => assert_eq!(&got, first),
                    None => expected = Some(got),
                }
            }
            let expected = expected.unwrap();
            if sort_by_due {
                assert_eq!(
                    expected,
                    vec!["starred", "due-soon", "due-late", "plain", "done-starred"]
                );
            } else {
                assert_eq!(
                    expected,
                    vec!["starred", "due-late", "plain", "due-soon", "done-starred"]
                );
            }
        }
    }

    #[test]
    fn ties_follow_input_order_in_every_permutation() {
        let mut tasks = mixed_tasks();
        tasks.push(task("twin-a", 3));
        tasks.push(task("twin-b", 3));
        for perm in permutations(tasks) {
            let a = perm.iter().position(|t| t.id == "twin-a").unwrap();
            let b = perm.iter().position(|t| t.id == "twin-b").unwrap();
            let view = ids(&project_view(&perm, &ViewFilter::default(), day(1)));
            let va = view.iter().position(|id| id == "twin-a").unwrap();
            let vb = view.iter().position(|id| id == "twin-b").unwrap();
            assert_eq!(a < b, va < vb);
        }
    }

    #[test]
    fn project_filter() {
        let mut work = task("w", 1);
        work.project_id = "proj-work".into();
        let home = task("h", 2);
        let tasks = vec![work, home];
        let filter = ViewFilter {
            project: ProjectSelection::Project("proj-work".into()),
            ..Default::default()
        };
        assert_eq!(ids(&project_view(&tasks, &filter, day(1))), vec!["w"]);
    }

    #[test]
    fn due_today_filter_uses_given_date() {
        let mut today = task("today", 1);
        today.due_date = Some(day(3));
        let mut tomorrow = task("tomorrow", 2);
        tomorrow.due_date = Some(day(4));
        let none = task("none", 3);
        let tasks = vec![today, tomorrow, none];
        let filter = ViewFilter {
            due_today: true,
            ..Default::default()
        };
        assert_eq!(ids(&project_view(&tasks, &filter, day(3))), vec!["today"]);
        assert_eq!(ids(&project_view(&tasks, &filter, day(4))), vec!["tomorrow"]);
    }

    #[test]
    fn search_is_case_insensitive_over_text_tags_notes() {
        let mut a = task("a", 1);
        a.text = "Email Landlord".into();
        let mut b = task("b", 2);
        b.tags = vec!["HOME".into()];
        let mut c = task("c", 3);
        c.notes = "ask about the landlord's number".into();
        let d = task("d", 4);
        let tasks = vec![a, b, c, d];

        let filter = ViewFilter {
            search: "LANDLORD".into(),
            ..Default::default()
        };
        assert_eq!(ids(&project_view(&tasks, &filter, day(1))), vec!["a", "c"]);

        let filter = ViewFilter {
            search: "home".into(),
            ..Default::default()
        };
        assert_eq!(ids(&project_view(&tasks, &filter, day(1))), vec!["b"]);
    }

    #[test]
    fn empty_search_passes_everything() {
        let tasks = vec![task("a", 1), task("b", 2)];
        let filter = ViewFilter {
            search: String::new(),
            ..Default::default()
        };
        assert_eq!(project_view(&tasks, &filter, day(1)).len(), 2);
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut tasks = Vec::new();
        for i in 0..10u32 {
            let mut t = task(&i.to_string(), i);
            t.done = i % 3 == 0;
            t.starred = i % 2 == 0;
            t.tags = if i % 4 == 0 { vec!["x".into()] } else { vec![] };
            tasks.push(t);
        }
        let filter = ViewFilter {
            search: "x".into(),
            ..Default::default()
        };
        let once: Vec<Task> = project_view(&tasks, &filter, day(1))
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<Task> = project_view(&once, &filter, day(1))
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn view_does_not_mutate_document() {
        let mut b = task("b", 1);
        b.starred = true;
        let tasks = vec![task("a", 0), b];
        let before = tasks.clone();
        let _ = project_view(&tasks, &ViewFilter::default(), day(1));
        assert_eq!(tasks, before);
    }

    #[test]
    fn overdue_requires_past_due_and_open() {
        let mut t = task("a", 1);
        assert!(!is_overdue(&t, day(5)));
        t.due_date = Some(day(4));
        assert!(is_overdue(&t, day(5)));
        assert!(!is_overdue(&t, day(4)));
        t.done = true;
        assert!(!is_overdue(&t, day(5)));
    }
}
