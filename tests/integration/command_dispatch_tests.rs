use super::{build_integration_test, CounterMsg};
use oxide_reconcile::Command;

#[test]
fn given_no_initial_command_should_render_once() {
    let program = build_integration_test().build();

    assert_eq!(program.version().ticks(), 0);
    program.with_container(|container| assert_eq!(container.layout_passes(), 1));
}

#[test]
fn given_an_initial_batch_should_run_commands_in_order() {
    let program = build_integration_test()
        .given_an_initial_command(Command::batch(vec![
            Command::just(CounterMsg::SetCounter(1)),
            Command::just(CounterMsg::Increment),
            Command::just(CounterMsg::Increment),
        ]))
        .build();

    assert_eq!(program.model().counter, 3);
    assert_eq!(program.version().ticks(), 3);
    assert_eq!(program.lookup("counter").unwrap().text().as_deref(), Some("3"));
}

#[test]
fn given_a_batch_run_directly_should_send_in_declaration_order() {
    let mut sent = Vec::new();

    Command::batch(vec![
        Command::routine(|| CounterMsg::SetCounter(1)),
        Command::routine(|| CounterMsg::SetCounter(2)),
    ])
    .run(&mut |msg| sent.push(msg));

    assert_eq!(sent, vec![CounterMsg::SetCounter(1), CounterMsg::SetCounter(2)]);
}

#[test]
fn given_randomize_should_ask_for_a_value_up_to_the_maximum() {
    let mut program = build_integration_test()
        .given_randomize_produces(7, 10)
        .build();

    program.send(CounterMsg::Randomize);

    assert_eq!(program.model().counter, 7);
    assert_eq!(program.lookup("slider").unwrap().value(), 7.0);
}

#[test]
fn given_a_randomize_press_should_run_the_command_after_rendering() {
    let mut program = build_integration_test()
        .given_randomize_produces(2, 10)
        .build();

    program.lookup("randomize").unwrap().send_action("touchUpInside");
    let processed = program.process_pending();

    // Randomize, then the SetCounter its command produced.
    assert_eq!(processed, 2);
    assert_eq!(program.model().counter, 2);
}

#[test]
fn given_the_real_generator_should_stay_within_the_range() {
    let mut program = build_integration_test().given_a_real_generator().build();

    program.send(CounterMsg::SetMaximumValue(4));
    for _ in 0..20 {
        program.send(CounterMsg::Randomize);
        assert!((0..=4).contains(&program.model().counter));
    }
}

#[test]
fn given_a_spawner_should_feed_performed_results_back() {
    let program = build_integration_test()
        .given_an_initial_command(Command::perform(async { CounterMsg::SetCounter(9) }))
        .build_with_spawner();

    assert_eq!(program.model().counter, 9);
    assert_eq!(program.lookup("counter").unwrap().text().as_deref(), Some("9"));
}

#[test]
fn given_no_spawner_should_block_on_performed_work() {
    let program = build_integration_test()
        .given_an_initial_command(Command::perform(async { CounterMsg::Decrement }))
        .build();

    assert_eq!(program.model().counter, 4);
}
