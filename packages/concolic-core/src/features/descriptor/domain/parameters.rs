//! Call parameters of a generated test

use serde::{Deserialize, Serialize};

/// Receiver, arguments and static state of one concrete call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters<T> {
    pub instance: Option<T>,
    pub arguments: Vec<T>,
    pub statics: Vec<T>,
}

impl<T> Default for Parameters<T> {
    fn default() -> Self {
        Self {
            instance: None,
            arguments: Vec::new(),
            statics: Vec::new(),
        }
    }
}

impl<T> Parameters<T> {
    pub fn new(instance: Option<T>, arguments: Vec<T>, statics: Vec<T>) -> Self {
        Self {
            instance,
            arguments,
            statics,
        }
    }

    /// Every parameter: instance first, then arguments, then statics
    pub fn all(&self) -> impl Iterator<Item = &T> {
        self.instance
            .iter()
            .chain(self.arguments.iter())
            .chain(self.statics.iter())
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Parameters<U> {
        Parameters {
            instance: self.instance.map(&mut f),
            arguments: self.arguments.into_iter().map(&mut f).collect(),
            statics: self.statics.into_iter().map(&mut f).collect(),
        }
    }

    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Parameters<U>, E> {
        Ok(Parameters {
            instance: self.instance.map(&mut f).transpose()?,
            arguments: self
                .arguments
                .into_iter()
                .map(&mut f)
                .collect::<Result<_, _>>()?,
            statics: self
                .statics
                .into_iter()
                .map(&mut f)
                .collect::<Result<_, _>>()?,
        })
    }
}
