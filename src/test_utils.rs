use chrono::{TimeDelta, Utc};

use crate::session::Credential;

pub const TEST_ACCESS_TOKEN: &str = "ya29.test-access-token";

pub fn valid_credential() -> Credential {
    Credential::new(TEST_ACCESS_TOKEN, Utc::now() + TimeDelta::hours(1))
}

pub fn expired_credential() -> Credential {
    Credential::new(TEST_ACCESS_TOKEN, Utc::now() - TimeDelta::minutes(1))
}
