use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use evoplan_core::feasibility::Violation;
use evoplan_core::model::{Meeting, DAY_NAMES};
use evoplan_core::problem::Problem;

/// Weekly schedule as a table, ordered by day then start slot.
pub fn schedule_table(problem: &Problem, meetings: &[Meeting]) -> Table {
    let mut rows: Vec<&Meeting> = meetings.iter().collect();
    rows.sort_by_key(|m| (m.day, m.start_slot, m.room));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Day", "Start", "End", "Subject", "Group", "Room", "Host"]);

    for m in rows {
        table.add_row(vec![
            DAY_NAMES[m.day].to_string(),
            problem.grid.slot_label(m.start_slot),
            problem.grid.slot_label(m.end_slot),
            problem.subjects[m.subject].name.clone(),
            problem.groups[m.group].name.clone(),
            problem.rooms[m.room].label(),
            problem.users[m.host].name.clone(),
        ]);
    }
    table
}

pub fn violations_table(violations: &[Violation]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Violation"]);
    for (i, v) in violations.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), v.to_string()]);
    }
    table
}
