use oxide_reconcile::headless::{self, Anchor, Constraint, ControlEvent, HeadlessContainer, HeadlessView, Target};
use oxide_reconcile::{Command, Element, LayoutContext, LayoutError, ProgramLogic, Projection, RandomGenerator};

pub(crate) const MASCOTS: [&str; 3] = ["cat", "dog", "fox"];

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum CounterMsg {
    Increment,
    Decrement,
    Randomize,
    SetCounter(i64),
    SetMaximumValue(i64),
    SetMascot(String),
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CounterModel {
    pub(crate) counter: i64,
    pub(crate) maximum_value: i64,
    pub(crate) mascot: String,
}

impl Default for CounterModel {
    fn default() -> Self {
        CounterModel {
            counter: 5,
            maximum_value: 10,
            mascot: String::from("cat"),
        }
    }
}

pub(crate) struct CounterLogic {
    pub(crate) initial_commands: Box<dyn InitialCommandDependency + Send + Sync>,
    pub(crate) random: Box<dyn RandomDependency + Send + Sync>,
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait InitialCommandDependency {
    fn on_init(&self) -> Command<CounterMsg>;
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait RandomDependency {
    fn randomize(&self, maximum: i64) -> Command<CounterMsg>;
}

/// Draws from the real generator.
pub(crate) struct GeneratedRandom;

impl RandomDependency for GeneratedRandom {
    fn randomize(&self, maximum: i64) -> Command<CounterMsg> {
        RandomGenerator::new(CounterMsg::SetCounter)
            .generate(0, maximum)
            .unwrap_or_default()
    }
}

fn button(key: &'static str, title: &str, msg: CounterMsg) -> Element<CounterMsg, HeadlessView> {
    headless::button(
        key,
        vec![
            headless::title(title),
            headless::on("touchUpInside", Projection::keyed(key, move |_: &ControlEvent| msg.clone())),
        ],
    )
}

impl ProgramLogic<CounterMsg, CounterModel, HeadlessContainer> for CounterLogic {
    fn init(&self, _model: &mut CounterModel) -> Command<CounterMsg> {
        self.initial_commands.on_init()
    }

    fn update(&self, msg: CounterMsg, model: &mut CounterModel) -> Command<CounterMsg> {
        match msg {
            CounterMsg::Increment => model.counter += 1,
            CounterMsg::Decrement => model.counter -= 1,
            CounterMsg::Randomize => return self.random.randomize(model.maximum_value),
            CounterMsg::SetCounter(counter) => model.counter = counter,
            CounterMsg::SetMaximumValue(maximum) => {
                model.maximum_value = maximum;
                model.counter = model.counter.min(maximum);
            }
            CounterMsg::SetMascot(mascot) => model.mascot = mascot,
            CounterMsg::Reset => *model = CounterModel::default(),
        }
        Command::none()
    }

    fn render(&self, model: &CounterModel) -> Vec<Element<CounterMsg, HeadlessView>> {
        vec![
            headless::label("counter", vec![headless::text(model.counter.to_string())]),
            headless::field(
                "entry",
                vec![
                    headless::text(model.counter.to_string()),
                    headless::placeholder("Enter a number"),
                    headless::on_editing_end(Projection::keyed("entry", |event: &ControlEvent| {
                        let text = event.text.as_deref().unwrap_or_default();
                        CounterMsg::SetCounter(text.trim().parse().unwrap_or_default())
                    })),
                ],
            ),
            headless::stepper(
                "stepper",
                vec![
                    headless::maximum(model.maximum_value as f64),
                    headless::value(model.counter as f64),
                    headless::on_value_changed(Projection::keyed("stepper", |event: &ControlEvent| {
                        CounterMsg::SetCounter(event.value as i64)
                    })),
                ],
            ),
            headless::slider(
                "slider",
                vec![
                    headless::maximum(model.maximum_value as f64),
                    headless::value(model.counter as f64),
                    headless::continuous(),
                    headless::on_value_changed(Projection::keyed("slider", |event: &ControlEvent| {
                        CounterMsg::SetCounter(event.value.round() as i64)
                    })),
                ],
            ),
            headless::segmented_control(
                "mascot",
                vec![
                    headless::selected_key(model.mascot.clone()),
                    headless::segments(
                        MASCOTS
                            .iter()
                            .map(|mascot| headless::segment(*mascot, mascot.to_uppercase()))
                            .collect(),
                    ),
                    headless::on_value_changed(Projection::keyed("mascot", |event: &ControlEvent| {
                        CounterMsg::SetMascot(event.selected_segment_key.clone().unwrap_or_default())
                    })),
                ],
            ),
            button("increment", "+", CounterMsg::Increment),
            button("decrement", "-", CounterMsg::Decrement),
            button("randomize", "Randomize", CounterMsg::Randomize),
            button("reset", "Reset", CounterMsg::Reset),
        ]
    }

    fn layout(
        &self,
        _model: &CounterModel,
        context: &LayoutContext<'_, HeadlessView>,
    ) -> Result<Vec<Constraint>, LayoutError> {
        let counter = context.require("counter")?;
        let entry = context.require("entry")?;
        let increment = context.require("increment")?;

        Ok(vec![
            Constraint::pin(counter, Anchor::Top, Target::Margins(Anchor::Top)),
            Constraint::pin(counter, Anchor::CenterX, Target::Margins(Anchor::CenterX)),
            Constraint::pin(entry, Anchor::Top, Target::view(counter, Anchor::Bottom)).offset(8.0),
            Constraint::pin(increment, Anchor::Top, Target::view(entry, Anchor::Bottom)).offset(8.0),
        ])
    }
}
