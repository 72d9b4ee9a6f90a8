//! Scripted byte sources for driving the reader thread

use hs_telemetry::backend::{ByteSource, ReadStatus};
use hs_telemetry::{HsError, Result};
use std::collections::VecDeque;

/// One scripted result of a read
#[derive(Debug, Clone)]
pub enum Step {
    Data(Vec<u8>),
    Idle,
    Fail(String),
}

/// Byte source that plays back a fixed list of read results, then closes
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: VecDeque<Step>,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

impl ByteSource for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        match self.steps.pop_front() {
            None => Ok(ReadStatus::Closed),
            Some(Step::Idle) => Ok(ReadStatus::Idle),
            Some(Step::Fail(message)) => Err(HsError::Transport(message)),
            Some(Step::Data(mut data)) => {
                if data.len() > buf.len() {
                    let rest = data.split_off(buf.len());
                    self.steps.push_front(Step::Data(rest));
                }
                buf[..data.len()].copy_from_slice(&data);
                Ok(ReadStatus::Data(data.len()))
            }
        }
    }

    fn write(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
