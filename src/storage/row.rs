//! Fixed-width row codec.
//!
//! A row has exactly three fields: an unsigned 32-bit `id`, and two
//! fixed-capacity text fields, `username` and `email`. The on-disk
//! representation is a flat memcpy of each field at a fixed offset;
//! there is no schema to consult, because this store has exactly one
//! table shape.

use crate::errors::Error;

pub const ID_SIZE: usize = 4;
/// Maximum number of bytes a username may hold, not counting the terminator.
pub const USERNAME_MAX_LEN: usize = 32;
/// Buffer width for the username field, including its nul terminator.
pub const USERNAME_SIZE: usize = USERNAME_MAX_LEN + 1;
/// Maximum number of bytes an email may hold, not counting the terminator.
pub const EMAIL_MAX_LEN: usize = 255;
/// Buffer width for the email field, including its nul terminator.
pub const EMAIL_SIZE: usize = EMAIL_MAX_LEN + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = EMAIL_OFFSET + EMAIL_SIZE;

/// A single logical record: `(id, username, email)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Builds a row, rejecting strings that overflow their fixed buffer.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self, Error> {
        if username.len() > USERNAME_MAX_LEN {
            return Err(err!(
                Validation,
                "username '{}' exceeds {} bytes",
                username,
                USERNAME_MAX_LEN
            ));
        }
        if email.len() > EMAIL_MAX_LEN {
            return Err(err!(
                Validation,
                "email '{}' exceeds {} bytes",
                email,
                EMAIL_MAX_LEN
            ));
        }

        let mut row = Row {
            id,
            username: [0u8; USERNAME_SIZE],
            email: [0u8; EMAIL_SIZE],
        };
        row.username[..username.len()].copy_from_slice(username.as_bytes());
        row.email[..email.len()].copy_from_slice(email.as_bytes());
        Ok(row)
    }

    pub fn username(&self) -> String {
        trimmed(&self.username)
    }

    pub fn email(&self) -> String {
        trimmed(&self.email)
    }

    /// Serializes the row into its fixed on-disk representation.
    pub fn serialize(&self) -> [u8; ROW_SIZE] {
        let mut buf = [0u8; ROW_SIZE];
        buf[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());
        buf[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&self.username);
        buf[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&self.email);
        buf
    }

    /// Parses a row out of exactly `ROW_SIZE` bytes, as read from a leaf cell.
    pub fn deserialize(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() != ROW_SIZE {
            return Err(err!(
                Corruption,
                "row buffer is {} bytes, expected {}",
                buf.len(),
                ROW_SIZE
            ));
        }
        let id = buf[ID_OFFSET..ID_OFFSET + ID_SIZE]
            .try_into()
            .map(u32::from_le_bytes)
            .map_err(|e| err!(Corruption, "failed to decode id: {:?}", e))?;
        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&buf[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);
        let mut email = [0u8; EMAIL_SIZE];
        email.copy_from_slice(&buf[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);
        Ok(Row {
            id,
            username,
            email,
        })
    }
}

fn trimmed(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username(), self.email())
    }
}
