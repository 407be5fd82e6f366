use crate::error::ConfigError;

/// Rate constants consumed strictly left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterStream {
    values: Vec<f64>,
    cursor: usize,
}

impl ParameterStream {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }

    /// Values consumed from position `from` up to the cursor.
    pub fn window(&self, from: usize) -> &[f64] {
        &self.values[from.min(self.cursor)..self.cursor]
    }

    /// Fails up front if fewer than `needed` values are left.
    pub fn ensure_remaining(&self, needed: usize) -> Result<(), ConfigError> {
        if self.remaining() < needed {
            return Err(ConfigError::StreamUnderrun {
                expected: self.cursor + needed,
                received: self.values.len(),
            });
        }
        Ok(())
    }

    pub fn next_value(&mut self) -> Result<f64, ConfigError> {
        let value = self
            .values
            .get(self.cursor)
            .copied()
            .ok_or(ConfigError::StreamUnderrun {
                expected: self.cursor + 1,
                received: self.values.len(),
            })?;
        self.cursor += 1;
        Ok(value)
    }

    pub fn take<const N: usize>(&mut self) -> Result<[f64; N], ConfigError> {
        self.ensure_remaining(N)?;
        let mut out = [0.0; N];
        for slot in out.iter_mut() {
            *slot = self.next_value()?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_in_order() {
        let mut stream = ParameterStream::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(stream.next_value().unwrap(), 1.0);
        assert_eq!(stream.take::<2>().unwrap(), [2.0, 3.0]);
        assert_eq!(stream.remaining(), 0);
        assert_eq!(stream.consumed(), 3);
        assert_eq!(stream.window(1), &[2.0, 3.0]);
    }

    #[test]
    fn underrun_reports_counts() {
        let mut stream = ParameterStream::new(vec![1.0, 2.0]);
        stream.next_value().unwrap();
        let err = stream.take::<3>().unwrap_err();
        assert_eq!(err, ConfigError::StreamUnderrun { expected: 4, received: 2 });
        // a failed take does not move the cursor
        assert_eq!(stream.consumed(), 1);
    }
}
