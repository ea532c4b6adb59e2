//! We use this mocking module in unit tests to emulate an I2C bus.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// Maximum bytes in a single scripted response or recorded write.
const MAX_BYTES: usize = 4;

/// Outcome of one scripted bus transaction.
#[derive(Debug, Clone)]
pub enum Step {
    /// The transaction succeeds, reads are filled from these bytes.
    Data(heapless::Vec<u8, MAX_BYTES>),
    /// The transaction fails with this error.
    Fail(MockI2cError),
}

impl Step {
    /// Successful transaction returning `bytes`.
    pub fn data(bytes: &[u8]) -> Self {
        Step::Data(heapless::Vec::from_slice(bytes).unwrap())
    }

    /// Successful write-only transaction.
    pub fn ack() -> Self {
        Step::Data(heapless::Vec::new())
    }

    /// Transaction the device does not acknowledge.
    pub fn nack() -> Self {
        Step::Fail(MockI2cError::NoAcknowledge)
    }
}

/// A transaction as seen on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub address: u8,
    pub written: heapless::Vec<u8, MAX_BYTES>,
    pub read_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockI2cError {
    /// Simulated missing acknowledge.
    NoAcknowledge,
    /// Simulated bus error.
    Bus,
    /// A read was issued with nothing left in the script.
    NoData,
}

impl embedded_hal::i2c::Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        match self {
            MockI2cError::NoAcknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            MockI2cError::Bus => ErrorKind::Bus,
            MockI2cError::NoData => ErrorKind::Other,
        }
    }
}

/// Our mock type used to emulate an I2C bus.
///
/// Every transaction consumes one [`Step`] from the script. Write-only transactions succeed
/// once the script runs dry, reads fail with [`MockI2cError::NoData`].
pub struct MockI2c {
    script: heapless::Deque<Step, 16>,
    transfers: heapless::Vec<Transfer, 32>,
}

impl ErrorType for MockI2c {
    type Error = MockI2cError;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut transfer = Transfer {
            address,
            written: heapless::Vec::new(),
            read_len: 0,
        };
        for operation in operations.iter() {
            match operation {
                Operation::Write(bytes) => transfer.written.extend_from_slice(bytes).unwrap(),
                Operation::Read(buffer) => transfer.read_len += buffer.len(),
            }
        }
        self.transfers.push(transfer).unwrap();

        let data = match self.script.pop_front() {
            Some(Step::Data(data)) => data,
            Some(Step::Fail(err)) => return Err(err),
            None if self.transfers.last().is_some_and(|t| t.read_len > 0) => {
                return Err(MockI2cError::NoData);
            }
            None => heapless::Vec::new(),
        };

        let mut position = 0;
        for operation in operations.iter_mut() {
            if let Operation::Read(buffer) = operation {
                for byte in buffer.iter_mut() {
                    *byte = *data.get(position).ok_or(MockI2cError::NoData)?;
                    position += 1;
                }
            }
        }
        Ok(())
    }
}

impl MockI2c {
    /// Create a new MockI2c with an empty script.
    pub fn new() -> Self {
        Self {
            script: heapless::Deque::new(),
            transfers: heapless::Vec::new(),
        }
    }

    /// Create a new MockI2c which will play back `steps` in order.
    pub fn with_script(steps: &[Step]) -> Self {
        let mut mock = Self::new();
        for step in steps {
            mock.push(step.clone());
        }
        mock
    }

    /// Append a step to the script.
    pub fn push(&mut self, step: Step) {
        self.script.push_back(step).unwrap();
    }

    /// Every transaction issued so far.
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Clear the transaction log.
    pub fn clear_transfers(&mut self) {
        self.transfers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error;

    #[test]
    fn test_write_read_plays_script() {
        let mut mock = MockI2c::with_script(&[Step::data(&[0x34, 0x12])]);
        let mut buffer = [0u8; 2];

        mock.write_read(0x0B, &[0x09], &mut buffer).unwrap();

        assert_eq!(buffer, [0x34, 0x12]);
        assert_eq!(mock.transfers().len(), 1);
        assert_eq!(mock.transfers()[0].address, 0x0B);
        assert_eq!(mock.transfers()[0].written.as_slice(), &[0x09]);
        assert_eq!(mock.transfers()[0].read_len, 2);
        assert_eq!(mock.remaining(), 0);
    }

    #[test]
    fn test_scripted_failure() {
        let mut mock = MockI2c::with_script(&[Step::nack(), Step::data(&[0x01])]);
        let mut buffer = [0u8; 1];

        let result = mock.read(0x41, &mut buffer);
        assert!(matches!(result, Err(MockI2cError::NoAcknowledge)));

        // The failed transaction is still logged, and the next step is untouched.
        assert_eq!(mock.transfers().len(), 1);
        mock.read(0x41, &mut buffer).unwrap();
        assert_eq!(buffer, [0x01]);
    }

    #[test]
    fn test_write_without_script() {
        let mut mock = MockI2c::new();
        mock.write(0x36, &[0x02, 0xF4]).unwrap();
        assert_eq!(mock.transfers()[0].written.as_slice(), &[0x02, 0xF4]);
        assert_eq!(mock.transfers()[0].read_len, 0);
    }

    #[test]
    fn test_read_without_script() {
        let mut mock = MockI2c::new();
        let mut buffer = [0u8; 2];
        let result = mock.read(0x36, &mut buffer);
        assert!(matches!(result, Err(MockI2cError::NoData)));
    }

    #[test]
    fn test_short_response() {
        let mut mock = MockI2c::with_script(&[Step::data(&[0x01])]);
        let mut buffer = [0u8; 2];
        let result = mock.read(0x36, &mut buffer);
        assert!(matches!(result, Err(MockI2cError::NoData)));
    }

    #[test]
    fn test_clear_transfers() {
        let mut mock = MockI2c::new();
        mock.write(0x36, &[0x02]).unwrap();
        mock.clear_transfers();
        assert!(mock.transfers().is_empty());
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            MockI2cError::NoAcknowledge.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        ));
        assert!(matches!(MockI2cError::Bus.kind(), ErrorKind::Bus));
        assert!(matches!(MockI2cError::NoData.kind(), ErrorKind::Other));
    }
}
