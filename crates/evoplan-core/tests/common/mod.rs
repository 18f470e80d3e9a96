use evoplan_core::model::{Group, Room, Subject, TimeGrid, User};
use evoplan_core::problem::Problem;

/// One host, one student group, one room, one 2-block subject on a
/// 5-day x 8-slot grid. Compiled and ready to score.
pub fn single_meeting_problem() -> Problem {
    let mut p = Problem {
        name: "single".into(),
        grid: TimeGrid::new(8),
        cycle: Default::default(),
        tags: vec![],
        users: vec![
            User { name: "host".into(), weight: 1.0, unavailable: vec![] },
            User { name: "student".into(), weight: 1.0, unavailable: vec![] },
        ],
        groups: vec![Group { name: "g".into(), members: vec![1] }],
        rooms: vec![Room {
            building_name: "Main".into(),
            room_number: "101".into(),
            capacity: 20,
            tags: vec![],
            unavailable: vec![],
        }],
        subjects: vec![Subject {
            name: "intro".into(),
            capacity: 10,
            min_students: 1,
            duration_blocks: 2,
            break_before: 0,
            break_after: 0,
            required_tags: vec![],
            hosts: vec![0],
            groups: vec![0],
        }],
        instances: vec![],
        preferences: vec![],
    };
    p.compile().unwrap();
    p
}

/// Two subjects with disjoint hosts and groups but a single shared room.
pub fn shared_room_problem() -> Problem {
    let mut p = Problem {
        name: "shared-room".into(),
        grid: TimeGrid::new(8),
        cycle: Default::default(),
        tags: vec![],
        users: vec![
            User { name: "host-a".into(), weight: 1.0, unavailable: vec![] },
            User { name: "host-b".into(), weight: 1.0, unavailable: vec![] },
            User { name: "s1".into(), weight: 1.0, unavailable: vec![] },
            User { name: "s2".into(), weight: 1.0, unavailable: vec![] },
        ],
        groups: vec![
            Group { name: "g1".into(), members: vec![2] },
            Group { name: "g2".into(), members: vec![3] },
        ],
        rooms: vec![Room {
            building_name: "Main".into(),
            room_number: "101".into(),
            capacity: 20,
            tags: vec![],
            unavailable: vec![],
        }],
        subjects: vec![
            Subject {
                name: "alpha".into(),
                capacity: 10,
                min_students: 1,
                duration_blocks: 2,
                break_before: 0,
                break_after: 0,
                required_tags: vec![],
                hosts: vec![0],
                groups: vec![0],
            },
            Subject {
                name: "beta".into(),
                capacity: 10,
                min_students: 1,
                duration_blocks: 2,
                break_before: 0,
                break_after: 0,
                required_tags: vec![],
                hosts: vec![1],
                groups: vec![1],
            },
        ],
        instances: vec![],
        preferences: vec![],
    };
    p.compile().unwrap();
    p
}
