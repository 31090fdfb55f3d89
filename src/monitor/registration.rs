//! Registration-pair monitor (class/chrdev/gendisk-style register/unregister).

use crate::errptr::errno;
use crate::monitor::Monitor;
use crate::session::{Session, Step};
use crate::violation::{RuleId, Violation};

const REG_DOUBLE: RuleId = RuleId::new("register", "double register");
const REG_NOT_REGISTERED: RuleId = RuleId::new("register", "unregister while unregistered");
const REG_LEFT_REGISTERED: RuleId = RuleId::new("register", "registered at exit");

/// Registration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RegState {
    #[default]
    Unregistered,
    Registered,
}

/// Monitor for a register/unregister pair.
///
/// Registration may fail nondeterministically (busy subsystem) before any
/// state change. Registering twice or unregistering an unregistered object
/// is a violation, with the old state preserved.
#[derive(Debug, Default)]
pub struct RegistrationMonitor {
    state: RegState,
}

impl RegistrationMonitor {
    /// Creates the monitor in the unregistered state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook for registration. Returns 0 on success or a negative errno.
    pub fn register(&mut self, cx: &mut Session) -> Step<i64> {
        if self.state == RegState::Registered {
            cx.report(REG_DOUBLE, "register while already registered");
            return Ok(-errno::EBUSY);
        }
        if cx.choose_bool() {
            self.state = RegState::Registered;
            return Ok(0);
        }
        Ok(-errno::EBUSY)
    }

    /// Hook for deregistration.
    pub fn unregister(&mut self, cx: &mut Session) {
        if self.state == RegState::Unregistered {
            cx.report(REG_NOT_REGISTERED, "unregister while unregistered");
            return;
        }
        self.state = RegState::Unregistered;
    }

    /// Read-only query hook: is the object currently registered?
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.state == RegState::Registered
    }
}

impl Monitor for RegistrationMonitor {
    fn name(&self) -> &'static str {
        "registration"
    }

    fn check_final(&self) -> Result<(), Violation> {
        if self.state == RegState::Registered {
            return Err(Violation::new(
                REG_LEFT_REGISTERED,
                "object still registered at module exit",
            ));
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = RegState::Unregistered;
    }
}
