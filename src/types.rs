use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{RegistrationError, Result};

/// Opaque id of a registered member, resolved before a command reaches the core.
pub type MemberId = String;

/// Opaque id of the browser session that holds a reservation.
pub type SessionId = String;

/// The kinds of rooms a conference sells, each with its own quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Single,
    BedInDouble,
    Junior,
    BedInJunior,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::Single,
        RoomType::BedInDouble,
        RoomType::Junior,
        RoomType::BedInJunior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::BedInDouble => "bed_in_double",
            RoomType::Junior => "junior",
            RoomType::BedInJunior => "bed_in_junior",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self> {
        RoomType::ALL
            .into_iter()
            .find(|room_type| room_type.as_str() == s.trim())
            .ok_or_else(|| RegistrationError::InvalidInput(format!("unknown room type `{s}`")))
    }
}

/// Length of a stay in nights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(pub u8);

impl Duration {
    pub fn nights(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a registrant asks for when starting or completing a registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Booking {
    Room { room_type: RoomType, duration: Duration },
    Waitlist { desired_room_types: Vec<RoomType> },
}

impl Booking {
    /// Literal duration value the registration form sends for waitlist requests.
    pub const WAITLIST: &'static str = "waitlist";

    /// Builds a booking from raw form values.
    ///
    /// A `"waitlist"` duration selects the waitlist regardless of how many room types were
    /// picked; otherwise exactly the first room type is booked for the given number of nights.
    pub fn from_form(room_types: &[RoomType], duration: &str) -> Result<Self> {
        let Some(first) = room_types.first() else {
            return Err(RegistrationError::InvalidInput(
                "at least one room type is required".to_string(),
            ));
        };

        if duration.trim() == Self::WAITLIST {
            return Ok(Booking::Waitlist {
                desired_room_types: room_types.to_vec(),
            });
        }

        let nights = duration.trim().parse::<u8>().map_err(|_| {
            RegistrationError::InvalidInput(format!("`{duration}` is not a valid duration"))
        })?;

        Ok(Booking::Room {
            room_type: *first,
            duration: Duration(nights),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_type_parses_its_own_name() {
        for room_type in RoomType::ALL {
            assert_eq!(room_type.to_string().parse::<RoomType>().unwrap(), room_type);
        }
        assert!("suite".parse::<RoomType>().is_err());
    }

    #[test]
    fn waitlist_duration_selects_the_waitlist() {
        let booking =
            Booking::from_form(&[RoomType::Single, RoomType::BedInDouble], "waitlist").unwrap();

        assert_eq!(
            booking,
            Booking::Waitlist {
                desired_room_types: vec![RoomType::Single, RoomType::BedInDouble]
            }
        );
    }

    #[test]
    fn numeric_duration_books_the_first_room_type() {
        let booking = Booking::from_form(&[RoomType::Junior], "3").unwrap();

        assert_eq!(
            booking,
            Booking::Room {
                room_type: RoomType::Junior,
                duration: Duration(3)
            }
        );
    }

    #[test]
    fn invalid_form_values_are_rejected() {
        assert!(matches!(
            Booking::from_form(&[], "2"),
            Err(RegistrationError::InvalidInput(_))
        ));
        assert!(matches!(
            Booking::from_form(&[RoomType::Single], "forever"),
            Err(RegistrationError::InvalidInput(_))
        ));
    }
}
