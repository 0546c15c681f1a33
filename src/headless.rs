//! In-memory widget set for driving the reconciler without a platform.
//!
//! Only available with the `testing` feature or during tests.
//!
//! Widgets behave like their platform counterparts where it matters to the
//! reconciler: sliders and steppers clamp their value into their range,
//! segmented controls remember which key each segment belongs to, and
//! actions fire bound handlers with a snapshot of the widget.

use serde::Deserialize;
use spin::Mutex;

use portable_atomic_util::Arc;

use crate::decode::ElementFactory;
use crate::error::DecodeError;
use crate::handler::{EventHandler, HandlerOptions, Projection};
use crate::reconciler::Container;
use crate::{Element, NativeView, Prop};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Label,
    Button,
    Field,
    Slider,
    Stepper,
    Switch,
    SegmentedControl,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub key: String,
    pub title: String,
    pub enabled: bool,
}

pub fn segment(key: impl Into<String>, title: impl Into<String>) -> Segment {
    Segment {
        key: key.into(),
        title: title.into(),
        enabled: true,
    }
}

/// Snapshot of a widget taken when one of its actions fires.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlEvent {
    pub action: String,
    pub text: Option<String>,
    pub value: f64,
    pub is_on: bool,
    pub selected_segment_key: Option<String>,
}

struct Widget {
    kind: WidgetKind,
    text: Option<String>,
    title: Option<String>,
    placeholder: Option<String>,
    value: f64,
    minimum: f64,
    maximum: f64,
    continuous: bool,
    is_on: bool,
    focused: bool,
    segments: Vec<Segment>,
    // Segment keys live on the widget itself, indexed like `segments`.
    selected_segment: Option<usize>,
    bindings: Vec<(String, Arc<EventHandler<ControlEvent>>)>,
    binding_changes: usize,
}

impl Widget {
    fn new(kind: WidgetKind) -> Self {
        let maximum = match kind {
            WidgetKind::Slider => 1.0,
            WidgetKind::Stepper => 100.0,
            _ => 0.0,
        };
        Widget {
            kind,
            text: None,
            title: None,
            placeholder: None,
            value: 0.0,
            minimum: 0.0,
            maximum,
            continuous: false,
            is_on: false,
            focused: false,
            segments: Vec::new(),
            selected_segment: None,
            bindings: Vec::new(),
            binding_changes: 0,
        }
    }

    fn is_ranged(&self) -> bool {
        matches!(self.kind, WidgetKind::Slider | WidgetKind::Stepper)
    }

    fn clamp_value(&mut self) {
        if self.is_ranged() {
            self.value = self.value.clamp(self.minimum, self.maximum);
        }
    }

    fn selected_segment_key(&self) -> Option<String> {
        self.selected_segment
            .and_then(|index| self.segments.get(index))
            .map(|segment| segment.key.clone())
    }

    fn snapshot(&self, action: &str) -> ControlEvent {
        ControlEvent {
            action: action.to_owned(),
            text: self.text.clone(),
            value: self.value,
            is_on: self.is_on,
            selected_segment_key: self.selected_segment_key(),
        }
    }
}

/// Opaque identity of a headless view, used by layout constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(usize);

/// Shared handle to an in-memory widget.
#[derive(Clone)]
pub struct HeadlessView(Arc<Mutex<Widget>>);

impl HeadlessView {
    pub fn new(kind: WidgetKind) -> Self {
        Self(Arc::new(Mutex::new(Widget::new(kind))))
    }

    pub fn id(&self) -> ViewId {
        ViewId(Arc::as_ptr(&self.0) as usize)
    }

    pub fn text(&self) -> Option<String> {
        self.0.lock().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.0.lock().text = Some(text.into());
    }

    pub fn title(&self) -> Option<String> {
        self.0.lock().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.0.lock().title = Some(title.into());
    }

    pub fn placeholder(&self) -> Option<String> {
        self.0.lock().placeholder.clone()
    }

    pub fn value(&self) -> f64 {
        self.0.lock().value
    }

    /// Set the value, clamped into range for sliders and steppers.
    pub fn set_value(&self, value: f64) {
        let mut widget = self.0.lock();
        widget.value = value;
        widget.clamp_value();
    }

    pub fn minimum(&self) -> f64 {
        self.0.lock().minimum
    }

    pub fn set_minimum(&self, minimum: f64) {
        let mut widget = self.0.lock();
        widget.minimum = minimum;
        if widget.maximum < minimum {
            widget.maximum = minimum;
        }
        widget.clamp_value();
    }

    pub fn maximum(&self) -> f64 {
        self.0.lock().maximum
    }

    pub fn set_maximum(&self, maximum: f64) {
        let mut widget = self.0.lock();
        widget.maximum = maximum;
        if widget.minimum > maximum {
            widget.minimum = maximum;
        }
        widget.clamp_value();
    }

    pub fn is_continuous(&self) -> bool {
        self.0.lock().continuous
    }

    pub fn is_on(&self) -> bool {
        self.0.lock().is_on
    }

    pub fn set_on(&self, on: bool) {
        self.0.lock().is_on = on;
    }

    pub fn is_focused(&self) -> bool {
        self.0.lock().focused
    }

    pub fn focus(&self) {
        self.0.lock().focused = true;
    }

    pub fn segment_titles(&self) -> Vec<String> {
        self.0
            .lock()
            .segments
            .iter()
            .map(|segment| segment.title.clone())
            .collect()
    }

    /// Replace the segments, keeping the selection only if still in range.
    pub fn set_segments(&self, segments: Vec<Segment>) {
        let mut widget = self.0.lock();
        widget.segments = segments;
        if widget.selected_segment.is_some_and(|index| index >= widget.segments.len()) {
            widget.selected_segment = None;
        }
    }

    /// Select the segment with `key`, or clear the selection if there is none.
    pub fn select_segment_key(&self, key: &str) {
        let mut widget = self.0.lock();
        let index = widget.segments.iter().position(|segment| segment.key == key);
        widget.selected_segment = index;
    }

    pub fn select_segment(&self, index: usize) {
        let mut widget = self.0.lock();
        if index < widget.segments.len() {
            widget.selected_segment = Some(index);
        }
    }

    pub fn selected_segment_key(&self) -> Option<String> {
        self.0.lock().selected_segment_key()
    }

    pub fn bound_actions(&self) -> Vec<String> {
        let mut actions: Vec<String> = self
            .0
            .lock()
            .bindings
            .iter()
            .map(|(action, _)| action.clone())
            .collect();
        actions.sort();
        actions
    }

    pub fn handler(&self, action: &str) -> Option<Arc<EventHandler<ControlEvent>>> {
        self.0
            .lock()
            .bindings
            .iter()
            .find(|(bound, _)| bound == action)
            .map(|(_, handler)| handler.clone())
    }

    /// How often a binding was added, swapped or removed.
    pub fn binding_changes(&self) -> usize {
        self.0.lock().binding_changes
    }

    /// Fire `action` as if the user had triggered it.
    ///
    /// Returns `false` when nothing is bound to the action.
    pub fn send_action(&self, action: &str) -> bool {
        let (handler, event) = {
            let widget = self.0.lock();
            let handler = widget
                .bindings
                .iter()
                .find(|(bound, _)| bound == action)
                .map(|(_, handler)| handler.clone());
            (handler, widget.snapshot(action))
        };

        match handler {
            Some(handler) => {
                handler.perform(&event);
                if handler.options().release_focus {
                    self.0.lock().focused = false;
                }
                true
            }
            None => false,
        }
    }
}

impl NativeView for HeadlessView {
    type Kind = WidgetKind;
    type Event = ControlEvent;

    fn kind(&self) -> WidgetKind {
        self.0.lock().kind
    }

    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn bind(&self, action: &str, handler: Arc<EventHandler<ControlEvent>>) {
        let mut widget = self.0.lock();
        match widget.bindings.iter().position(|(bound, _)| bound == action) {
            Some(index) if Arc::ptr_eq(&widget.bindings[index].1, &handler) => {}
            Some(index) => {
                widget.bindings[index].1 = handler;
                widget.binding_changes += 1;
            }
            None => {
                widget.bindings.push((action.to_owned(), handler));
                widget.binding_changes += 1;
            }
        }
    }

    fn retain_bindings(&self, actions: &[&str]) {
        let mut widget = self.0.lock();
        let before = widget.bindings.len();
        widget
            .bindings
            .retain(|(bound, _)| actions.contains(&bound.as_str()));
        let removed = before - widget.bindings.len();
        widget.binding_changes += removed;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Bottom,
    Leading,
    Trailing,
    CenterX,
    CenterY,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// An anchor of the container's margins.
    Margins(Anchor),
    View(ViewId, Anchor),
}

impl Target {
    pub fn view(view: &HeadlessView, anchor: Anchor) -> Self {
        Target::View(view.id(), anchor)
    }
}

/// "`anchor` of `item` equals `target` plus `constant`".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraint {
    pub item: ViewId,
    pub anchor: Anchor,
    pub target: Target,
    pub constant: f64,
}

impl Constraint {
    pub fn pin(view: &HeadlessView, anchor: Anchor, target: Target) -> Self {
        Constraint {
            item: view.id(),
            anchor,
            target,
            constant: 0.0,
        }
    }

    pub fn offset(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }
}

/// Parent of headless views.
///
/// Each layout pass replaces the previously active constraints.
#[derive(Default)]
pub struct HeadlessContainer {
    children: Vec<HeadlessView>,
    constraints: Vec<Constraint>,
    attaches: usize,
    detaches: usize,
    layout_passes: usize,
}

impl HeadlessContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[HeadlessView] {
        &self.children
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn attach_count(&self) -> usize {
        self.attaches
    }

    pub fn detach_count(&self) -> usize {
        self.detaches
    }

    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }
}

impl Container for HeadlessContainer {
    type View = HeadlessView;
    type Constraint = Constraint;

    fn attach(&mut self, view: &HeadlessView) {
        self.children.push(view.clone());
        self.attaches += 1;
    }

    fn detach(&mut self, view: &HeadlessView) {
        self.children.retain(|child| !child.is_same(view));
        self.detaches += 1;
    }

    fn activate(&mut self, constraints: Vec<Constraint>) {
        self.constraints = constraints;
        self.layout_passes += 1;
    }
}

pub type HeadlessProp<Msg> = Prop<Msg, HeadlessView>;
pub type HeadlessElement<Msg> = Element<Msg, HeadlessView>;

fn widget<Msg: Send + 'static>(
    key: impl Into<String>,
    kind: WidgetKind,
    props: Vec<HeadlessProp<Msg>>,
) -> HeadlessElement<Msg> {
    Element::with_props(key, kind, move || HeadlessView::new(kind), props)
}

pub fn label<Msg: Send + 'static>(key: impl Into<String>, props: Vec<HeadlessProp<Msg>>) -> HeadlessElement<Msg> {
    widget(key, WidgetKind::Label, props)
}

pub fn button<Msg: Send + 'static>(key: impl Into<String>, props: Vec<HeadlessProp<Msg>>) -> HeadlessElement<Msg> {
    widget(key, WidgetKind::Button, props)
}

pub fn field<Msg: Send + 'static>(key: impl Into<String>, props: Vec<HeadlessProp<Msg>>) -> HeadlessElement<Msg> {
    widget(key, WidgetKind::Field, props)
}

pub fn slider<Msg: Send + 'static>(key: impl Into<String>, props: Vec<HeadlessProp<Msg>>) -> HeadlessElement<Msg> {
    widget(key, WidgetKind::Slider, props)
}

pub fn stepper<Msg: Send + 'static>(key: impl Into<String>, props: Vec<HeadlessProp<Msg>>) -> HeadlessElement<Msg> {
    widget(key, WidgetKind::Stepper, props)
}

pub fn switch<Msg: Send + 'static>(key: impl Into<String>, props: Vec<HeadlessProp<Msg>>) -> HeadlessElement<Msg> {
    widget(key, WidgetKind::Switch, props)
}

pub fn segmented_control<Msg: Send + 'static>(
    key: impl Into<String>,
    props: Vec<HeadlessProp<Msg>>,
) -> HeadlessElement<Msg> {
    widget(key, WidgetKind::SegmentedControl, props)
}

pub fn text<Msg>(text: impl Into<String>) -> HeadlessProp<Msg> {
    let text = text.into();
    Prop::change(move |view: &HeadlessView| view.set_text(text.clone()))
}

pub fn title<Msg>(title: impl Into<String>) -> HeadlessProp<Msg> {
    let title = title.into();
    Prop::change(move |view: &HeadlessView| view.set_title(title.clone()))
}

pub fn placeholder<Msg>(placeholder: impl Into<String>) -> HeadlessProp<Msg> {
    let placeholder = placeholder.into();
    Prop::change(move |view: &HeadlessView| {
        view.0.lock().placeholder = Some(placeholder.clone());
    })
}

/// Value of a ranged control, applied after its bounds.
pub fn value<Msg>(value: f64) -> HeadlessProp<Msg> {
    Prop::staged(10, move |view: &HeadlessView| view.set_value(value))
}

pub fn minimum<Msg>(minimum: f64) -> HeadlessProp<Msg> {
    Prop::change(move |view: &HeadlessView| view.set_minimum(minimum))
}

pub fn maximum<Msg>(maximum: f64) -> HeadlessProp<Msg> {
    Prop::change(move |view: &HeadlessView| view.set_maximum(maximum))
}

pub fn continuous<Msg>() -> HeadlessProp<Msg> {
    Prop::change(|view: &HeadlessView| view.0.lock().continuous = true)
}

pub fn is_on<Msg>(on: bool) -> HeadlessProp<Msg> {
    Prop::change(move |view: &HeadlessView| view.set_on(on))
}

pub fn segments<Msg>(segments: Vec<Segment>) -> HeadlessProp<Msg> {
    Prop::change(move |view: &HeadlessView| view.set_segments(segments.clone()))
}

/// Selection by segment key, applied once the segments are in place.
pub fn selected_key<Msg>(key: impl Into<String>) -> HeadlessProp<Msg> {
    let key = key.into();
    Prop::staged(1, move |view: &HeadlessView| view.select_segment_key(&key))
}

pub fn on<Msg>(action: &'static str, projection: Projection<Msg, ControlEvent>) -> HeadlessProp<Msg> {
    Prop::on(action, projection)
}

/// Fires on press. The closure is a fresh projection on every render.
pub fn on_press<Msg, F>(make: F) -> HeadlessProp<Msg>
where
    F: Fn() -> Msg + Send + Sync + 'static,
{
    Prop::on("touchUpInside", Projection::new(move |_: &ControlEvent| make()))
}

pub fn on_value_changed<Msg>(projection: Projection<Msg, ControlEvent>) -> HeadlessProp<Msg> {
    Prop::on("valueChanged", projection)
}

/// Fires when editing ends with return, then releases focus.
pub fn on_editing_end<Msg>(projection: Projection<Msg, ControlEvent>) -> HeadlessProp<Msg> {
    Prop::on_with("editingDidEndOnExit", projection, HandlerOptions::releasing_focus())
}

#[derive(Deserialize)]
struct TextProps {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ButtonProps {
    title: Option<String>,
}

#[derive(Deserialize)]
struct FieldProps {
    text: Option<String>,
    placeholder: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeProps {
    value: Option<f64>,
    minimum_value: Option<f64>,
    maximum_value: Option<f64>,
}

/// Builds headless elements from their serialized form.
///
/// Understands `label`, `button`, `field` and `slider`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadlessFactory;

impl<Msg: Send + 'static> ElementFactory<Msg, HeadlessView> for HeadlessFactory {
    fn build(
        &self,
        kind: &str,
        key: String,
        props: serde_json::Value,
    ) -> Result<HeadlessElement<Msg>, DecodeError> {
        match kind {
            "label" => {
                let decoded: TextProps = serde_json::from_value(props)?;
                Ok(label(key, decoded.text.into_iter().map(text).collect()))
            }
            "button" => {
                let decoded: ButtonProps = serde_json::from_value(props)?;
                Ok(button(key, decoded.title.into_iter().map(title).collect()))
            }
            "field" => {
                let decoded: FieldProps = serde_json::from_value(props)?;
                let mut field_props = Vec::new();
                field_props.extend(decoded.text.map(text));
                field_props.extend(decoded.placeholder.map(placeholder));
                Ok(field(key, field_props))
            }
            "slider" => {
                let decoded: RangeProps = serde_json::from_value(props)?;
                let mut slider_props = Vec::new();
                slider_props.extend(decoded.minimum_value.map(minimum));
                slider_props.extend(decoded.maximum_value.map(maximum));
                slider_props.extend(decoded.value.map(value));
                Ok(slider(key, slider_props))
            }
            other => Err(DecodeError::UnknownType(other.to_owned())),
        }
    }
}
