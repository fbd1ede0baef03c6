use chrono::{Days, Local};

use elite65::line_editor::{LineEditor, ReadResult};
use elite65::session::Conversation;
use elite65::store::InMemoryStore;
use elite65::types::{Difficulty, Habit, HabitLog, SkillStat, TaskStatus};

fn main() {
    env_logger::init();

    let mut store = seed_store();
    let mut convo = Conversation::new();
    let mut editor = match LineEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("failed to initialize terminal: {}", e);
            std::process::exit(1);
        }
    };

    println!("╔════════════════════════════════════════════╗");
    println!("║  Elite65 — your productivity sidekick      ║");
    println!("║  Try 'help'. 'quit' to leave.              ║");
    println!("╚════════════════════════════════════════════╝");
    println!();

    loop {
        match editor.read_line(">> ") {
            ReadResult::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
                    break;
                }
                editor.add_history(line);
                if line.eq_ignore_ascii_case("reset") {
                    convo.reset();
                    println!("Fresh start. What's next?");
                    continue;
                }
                let reply = convo.submit(line, &mut store);
                println!("{}", reply);
                println!();
            }
            ReadResult::Interrupted => continue,
            ReadResult::Eof => break,
        }
    }

    println!("See you!");
}

/// Demo world: a couple of courses, tasks (one overdue), habits with a log
/// for today, and a mid-game progression snapshot.
fn seed_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();
    let now = Local::now();

    let biology = store.add_tracker("Biology");
    store.add_tracker("General");

    let essay = store.add_task("Write lab report", TaskStatus::InProgress, Difficulty::Hard);
    if let Some(task) = store.task_mut(&essay) {
        task.tracker_id = Some(biology.clone());
        task.skills = vec!["Writing".into(), "Biology".into()];
        task.due_date = now
            .checked_sub_days(Days::new(1))
            .map(|d| d.timestamp_millis());
    }

    let reading = store.add_task("Read chapter 4", TaskStatus::NotStarted, Difficulty::Easy);
    if let Some(task) = store.task_mut(&reading) {
        task.tracker_id = Some(biology);
        task.due_date = now
            .checked_add_days(Days::new(2))
            .map(|d| d.timestamp_millis());
    }
    store.add_task("Laundry", TaskStatus::NotStarted, Difficulty::Easy);

    store.habits.push(Habit {
        id: "habit-1".into(),
        title: "Drink water".into(),
        goal_amount: 8.0,
        unit: "glasses".into(),
        start_date: now.timestamp_millis(),
    });
    store.habits.push(Habit {
        id: "habit-2".into(),
        title: "Stretch".into(),
        goal_amount: 10.0,
        unit: "minutes".into(),
        start_date: now.timestamp_millis(),
    });
    store.habit_logs.push(HabitLog {
        habit_id: "habit-1".into(),
        date: now.date_naive(),
        value: 3.0,
    });

    store.user_stats.level = 4;
    store.user_stats.xp = 120;
    store.user_stats.next_level_xp = 250;
    store.user_stats.streak = 6;
    store
        .user_stats
        .skills
        .insert("Writing".into(), SkillStat { level: 3, value: 40.0 });
    store
        .user_stats
        .skills
        .insert("Biology".into(), SkillStat { level: 2, value: 75.0 });

    store
}
