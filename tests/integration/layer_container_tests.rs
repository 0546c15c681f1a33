use portable_atomic_util::Arc;
use spin::Mutex;

use oxide_reconcile::{
    Command, Container, Element, EventHandler, LayoutContext, LayoutError, NativeView, Program, ProgramLogic,
    Prop, Reconciler, Store,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayerKind {
    Shape,
    Text,
}

struct LayerState {
    kind: LayerKind,
    opacity: f32,
    contents: Option<String>,
    z_position: i32,
}

/// A compositing layer: no controls, no events.
#[derive(Clone)]
struct Layer(Arc<Mutex<LayerState>>);

impl Layer {
    fn new(kind: LayerKind) -> Self {
        Layer(Arc::new(Mutex::new(LayerState {
            kind,
            opacity: 1.0,
            contents: None,
            z_position: 0,
        })))
    }

    fn opacity(&self) -> f32 {
        self.0.lock().opacity
    }

    fn contents(&self) -> Option<String> {
        self.0.lock().contents.clone()
    }

    fn z_position(&self) -> i32 {
        self.0.lock().z_position
    }
}

impl NativeView for Layer {
    type Kind = LayerKind;
    type Event = ();

    fn kind(&self) -> LayerKind {
        self.0.lock().kind
    }

    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn bind(&self, _action: &str, _handler: Arc<EventHandler<()>>) {}

    fn retain_bindings(&self, _actions: &[&str]) {}
}

/// Sublayers of one root layer, stacked by z position.
#[derive(Default)]
struct LayerStack {
    sublayers: Vec<Layer>,
    passes: usize,
}

impl Container for LayerStack {
    type View = Layer;
    type Constraint = (Layer, i32);

    fn attach(&mut self, layer: &Layer) {
        self.sublayers.push(layer.clone());
    }

    fn detach(&mut self, layer: &Layer) {
        self.sublayers.retain(|sublayer| !sublayer.is_same(layer));
    }

    fn activate(&mut self, constraints: Vec<(Layer, i32)>) {
        for (layer, z_position) in constraints {
            layer.0.lock().z_position = z_position;
        }
        self.passes += 1;
    }
}

fn shape<Msg: Send + 'static>(key: &str, opacity: f32) -> Element<Msg, Layer> {
    Element::with_props(
        key,
        LayerKind::Shape,
        || Layer::new(LayerKind::Shape),
        vec![Prop::change(move |layer: &Layer| layer.0.lock().opacity = opacity)],
    )
}

fn text<Msg: Send + 'static>(key: &str, contents: &str) -> Element<Msg, Layer> {
    let contents = contents.to_owned();
    Element::with_props(
        key,
        LayerKind::Text,
        || Layer::new(LayerKind::Text),
        vec![Prop::change(move |layer: &Layer| layer.0.lock().contents = Some(contents.clone()))],
    )
}

fn reconciler() -> (Store<(), ()>, Reconciler<(), LayerStack>) {
    let store = Store::new((), |_: (), _: &mut ()| Command::none());
    let reconciler = Reconciler::new(LayerStack::default(), store.emitter());
    (store, reconciler)
}

#[test]
fn given_a_layer_stack_should_reuse_by_key_and_swap_on_kind_change() {
    let (_store, mut reconciler) = reconciler();
    reconciler
        .update(&[shape("background", 1.0), text("title", "Hello")])
        .unwrap();
    let background = reconciler.lookup("background").unwrap().clone();
    let title = reconciler.lookup("title").unwrap().clone();

    let report = reconciler
        .update(&[shape("background", 0.5), shape("title", 0.8)])
        .unwrap();

    assert_eq!(report.reused, 1);
    assert_eq!(report.replaced, 1);
    assert!(background.is_same(reconciler.lookup("background").unwrap()));
    assert_eq!(background.opacity(), 0.5);
    assert_eq!(title.contents().as_deref(), Some("Hello"));
    let stack = reconciler.container();
    assert_eq!(stack.sublayers.len(), 2);
    assert!(!stack.sublayers.iter().any(|sublayer| sublayer.is_same(&title)));
    assert_eq!(reconciler.lookup("title").unwrap().kind(), LayerKind::Shape);
}

#[test]
fn given_a_layer_stack_should_activate_its_own_constraints() {
    let (_store, mut reconciler) = reconciler();
    reconciler
        .update(&[shape("background", 1.0), text("title", "Hello")])
        .unwrap();

    reconciler
        .apply_layout(|context| {
            Ok(vec![
                (context.require("title")?.clone(), 2),
                (context.require("background")?.clone(), -1),
            ])
        })
        .unwrap();

    assert_eq!(reconciler.lookup("title").unwrap().z_position(), 2);
    assert_eq!(reconciler.lookup("background").unwrap().z_position(), -1);
    assert_eq!(reconciler.container().passes, 1);
}

/// Fades a badge in one step at a time and keeps it above the backdrop.
struct Fader;

impl ProgramLogic<(), f32, LayerStack> for Fader {
    fn update(&self, _: (), opacity: &mut f32) -> Command<()> {
        *opacity = (*opacity + 0.25).min(1.0);
        Command::none()
    }

    fn render(&self, opacity: &f32) -> Vec<Element<(), Layer>> {
        vec![shape("backdrop", 1.0), text("badge", "New"), shape("glow", *opacity)]
    }

    fn layout(&self, opacity: &f32, context: &LayoutContext<'_, Layer>) -> Result<Vec<(Layer, i32)>, LayoutError> {
        let glow = if *opacity > 0.0 { 1 } else { -1 };
        Ok(vec![
            (context.require("backdrop")?.clone(), 0),
            (context.require("badge")?.clone(), 2),
            (context.require("glow")?.clone(), glow),
        ])
    }
}

#[test]
fn given_a_program_over_a_layer_stack_should_render_and_lay_out_each_message() {
    let mut program = Program::new(LayerStack::default(), 0.0, Fader);
    let glow = program.lookup("glow").unwrap();
    assert_eq!(glow.z_position(), -1);

    program.send(());
    program.send(());

    assert!(glow.is_same(&program.lookup("glow").unwrap()));
    assert_eq!(glow.opacity(), 0.5);
    assert_eq!(glow.z_position(), 1);
    assert_eq!(program.lookup("badge").unwrap().z_position(), 2);
    assert_eq!(program.with_container(|stack| (stack.sublayers.len(), stack.passes)), (3, 3));
    assert!(program.take_errors().is_empty());
}
