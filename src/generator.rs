//! Random number commands.

use rand::RngExt;

use crate::error::GeneratorError;
use crate::Command;

/// Produces commands that draw a random integer and map it to a message.
///
/// ```rust
/// use oxide_reconcile::RandomGenerator;
///
/// #[derive(Debug)]
/// enum Msg { SetCounter(i64) }
///
/// let generator = RandomGenerator::new(Msg::SetCounter);
/// let command = generator.generate(0, 10).unwrap();
///
/// let mut sent = Vec::new();
/// command.run(&mut |msg| sent.push(msg));
/// assert!(matches!(sent[0], Msg::SetCounter(n) if (0..=10).contains(&n)));
/// ```
#[derive(Clone)]
pub struct RandomGenerator<F> {
    to_message: F,
}

impl<F> RandomGenerator<F> {
    pub fn new(to_message: F) -> Self {
        Self { to_message }
    }

    /// A command drawing uniformly from `min..=max` when run.
    ///
    /// Nothing is drawn until the command runs.
    pub fn generate<Msg>(&self, min: i64, max: i64) -> Result<Command<Msg>, GeneratorError>
    where
        F: Fn(i64) -> Msg + Clone + Send + 'static,
    {
        if max < min {
            return Err(GeneratorError::InvalidRange { min, max });
        }

        let to_message = self.to_message.clone();
        Ok(Command::routine(move || {
            let value = rand::rng().random_range(min..=max);
            to_message(value)
        }))
    }
}
