use trellis_config::{write_temp_config, ConfigLoader, ReconcileMode, TrellisConfig};
use trellis_todo::{Filter, Step, TodoApp};

fn run(config: &TrellisConfig, steps: &[&str]) -> TodoApp {
    let app = TodoApp::new(config).unwrap();
    for step in steps {
        app.run(&step.parse::<Step>().unwrap()).unwrap();
    }
    app
}

fn keyed() -> TrellisConfig {
    let mut config = TrellisConfig::default();
    config.render.reconcile = ReconcileMode::Keyed;
    config
}

fn dom_created(app: &TodoApp) -> usize {
    app.renderer().borrow().dom().created_count()
}

#[test]
fn empty_page_has_only_the_header() {
    let app = TodoApp::new(&TrellisConfig::default()).unwrap();

    insta::assert_snapshot!(
        app.html(),
        @r#"<div class="todoapp"><header class="header"><h1>todos</h1><input autofocus="" class="new-todo" placeholder="What needs to be done?"></header></div>"#
    );
}

#[test]
fn two_todos_one_completed() {
    let app = run(
        &TrellisConfig::default(),
        &["add:milk", "add:eggs", "toggle:1"],
    );

    insta::assert_snapshot!(
        app.html(),
        @r##"<div class="todoapp"><header class="header"><h1>todos</h1><input autofocus="" class="new-todo" placeholder="What needs to be done?"></header><section class="main"><input class="toggle-all" id="toggle-all" type="checkbox"><label for="toggle-all">Mark all as complete</label><ul class="todo-list"><li class="completed" data-todo-id="1"><div class="view"><input class="toggle" type="checkbox" :checked><label>milk</label><button class="destroy"></button></div></li><li data-todo-id="2"><div class="view"><input class="toggle" type="checkbox"><label>eggs</label><button class="destroy"></button></div></li></ul></section><footer class="footer"><span class="todo-count"><strong>1</strong> item left</span><ul class="filters"><li><a class="selected" href="#/">All</a></li><li><a href="#/active">Active</a></li><li><a href="#/completed">Completed</a></li></ul><button class="clear-completed">Clear completed</button></footer></div>"##
    );
}

#[test]
fn editing_shows_and_removes_the_edit_field() {
    let app = run(&TrellisConfig::default(), &["add:milk", "edit:1:oat milk"]);

    let state = app.state();
    assert_eq!(state.todos[0].text, "oat milk");
    assert_eq!(state.editing, None);

    let renderer = app.renderer().borrow();
    assert!(renderer.dom().query_class(app.container(), "edit").is_empty());
    assert!(renderer.dom().text_content(app.container()).contains("oat milk"));
}

#[test]
fn completed_filter_hides_active_items() {
    let app = run(
        &TrellisConfig::default(),
        &["add:a", "add:b", "add:c", "toggle:2", "filter:completed"],
    );

    let renderer = app.renderer().borrow();
    let dom = renderer.dom();
    let labels: Vec<String> = dom
        .query_class(app.container(), "todo-list")
        .into_iter()
        .flat_map(|list| dom.query_tag(list, "label"))
        .map(|label| dom.text_content(label))
        .collect();
    assert_eq!(labels, vec!["b"]);
    assert_eq!(app.state().filter, Filter::Completed);
}

#[test]
fn clearing_completed_removes_the_footer_button() {
    let app = run(
        &TrellisConfig::default(),
        &["add:a", "add:b", "toggle-all", "clear-completed"],
    );

    assert!(app.state().todos.is_empty());
    insta::assert_snapshot!(
        app.html(),
        @r#"<div class="todoapp"><header class="header"><h1>todos</h1><input autofocus="" class="new-todo" placeholder="What needs to be done?"></header></div>"#
    );
}

#[test]
fn keyed_mode_reuses_items_when_the_first_is_destroyed() {
    let positional = run(&TrellisConfig::default(), &["add:a", "add:b", "add:c"]);
    let keyed_app = run(&keyed(), &["add:a", "add:b", "add:c"]);
    let before = (dom_created(&positional), dom_created(&keyed_app));

    positional.run(&Step::Destroy(1)).unwrap();
    keyed_app.run(&Step::Destroy(1)).unwrap();

    assert_eq!(positional.html(), keyed_app.html());
    // Keys shift under positional patching, so the surviving items are
    // rebuilt; keyed patching moves them.
    assert!(dom_created(&positional) > before.0);
    assert_eq!(dom_created(&keyed_app), before.1);
}

#[test]
fn undelegated_change_events_do_nothing() {
    let config = ConfigLoader::parse(
        r#"
        [events]
        delegated = ["click", "keydown", "input"]
        "#,
    )
    .unwrap();
    let app = run(&config, &["add:a"]);

    app.run(&Step::Toggle(1)).unwrap();

    assert!(!app.state().todos[0].completed);
}

#[test]
fn config_file_selects_keyed_mode() {
    let (_dir, path) = write_temp_config(
        r#"
        [render]
        reconcile = "keyed"

        [logging]
        level = "debug"
        format = "json"
        "#,
    )
    .unwrap();

    let config = ConfigLoader::load_or_default(Some(path.as_path())).unwrap();
    assert_eq!(config.render.reconcile, ReconcileMode::Keyed);

    let app = run(&config, &["add:a", "add:b", "toggle:2"]);
    assert_eq!(app.renderer().borrow().differ().mode(), ReconcileMode::Keyed);
    assert_eq!(app.state().completed_count(), 1);
}

#[test]
fn fresh_document_matches_patched_one() {
    let app = run(&keyed(), &["add:a", "add:b", "destroy:1", "add:c", "edit:2:d"]);

    let fresh = TodoApp::with_state(&keyed(), app.state()).unwrap();
    assert_eq!(app.html(), fresh.html());
}
