//! Staged property changes and event bindings applied to native views.

use std::borrow::Cow;

use crate::handler::{EventHandlerSet, HandlerOptions, Projection};
use crate::NativeView;

enum PropAction<Msg, V: NativeView> {
    Change(Box<dyn Fn(&V)>),
    On {
        action: Cow<'static, str>,
        projection: Projection<Msg, V::Event>,
        options: HandlerOptions,
    },
}

/// One declared property of an element.
///
/// Every prop has a stage. Lower stages are applied first and props sharing
/// a stage keep their declaration order, which lets a descriptor set a range
/// before a value that has to fall inside it.
pub struct Prop<Msg, V: NativeView> {
    stage: i32,
    action: PropAction<Msg, V>,
}

impl<Msg, V: NativeView> Prop<Msg, V> {
    /// A change applied to the view at stage 0.
    pub fn change<F>(f: F) -> Self
    where
        F: Fn(&V) + 'static,
    {
        Self::staged(0, f)
    }

    pub fn staged<F>(stage: i32, f: F) -> Self
    where
        F: Fn(&V) + 'static,
    {
        Self {
            stage,
            action: PropAction::Change(Box::new(f)),
        }
    }

    /// Bind `projection` to the view's `action`.
    pub fn on(action: impl Into<Cow<'static, str>>, projection: Projection<Msg, V::Event>) -> Self {
        Self::on_with(action, projection, HandlerOptions::default())
    }

    pub fn on_with(
        action: impl Into<Cow<'static, str>>,
        projection: Projection<Msg, V::Event>,
        options: HandlerOptions,
    ) -> Self {
        Self {
            stage: 0,
            action: PropAction::On {
                action: action.into(),
                projection,
                options,
            },
        }
    }

    pub fn at_stage(mut self, stage: i32) -> Self {
        self.stage = stage;
        self
    }

    pub fn stage(&self) -> i32 {
        self.stage
    }
}

/// Declaration indexes of `props` in the order they are applied.
pub fn prioritised<Msg, V: NativeView>(props: &[Prop<Msg, V>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..props.len()).collect();
    // Stable, so equal stages keep declaration order.
    order.sort_by_key(|&index| props[index].stage);
    order
}

/// Apply every prop to `view` in prioritised order.
///
/// Event props register through `handlers` and bind the returned handler;
/// bindings for actions not declared this time are dropped afterwards.
pub fn apply_props<Msg, V>(props: &[Prop<Msg, V>], view: &V, handlers: &mut EventHandlerSet<Msg, V::Event>)
where
    Msg: Send + 'static,
    V: NativeView,
{
    let mut bound: Vec<&str> = Vec::new();

    for index in prioritised(props) {
        match &props[index].action {
            PropAction::Change(apply) => apply(view),
            PropAction::On {
                action,
                projection,
                options,
            } => {
                let handler = handlers.register(action, projection, *options);
                view.bind(action, handler);
                bound.push(action);
            }
        }
    }

    view.retain_bindings(&bound);
}
