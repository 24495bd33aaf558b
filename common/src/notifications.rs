use crate::logger::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A transient message for the delivery agent, one per command outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Where notifications end up. The console build prints them; a UI would
/// show them as toasts.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub struct LoggerNotifier {
    logger: Logger,
}

impl LoggerNotifier {
    pub fn new(logger: Logger) -> Self {
        LoggerNotifier { logger }
    }
}

impl Notifier for LoggerNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => self.logger.success(notification.message),
            NotificationLevel::Info => self.logger.info(notification.message),
            NotificationLevel::Error => self.logger.error(notification.message),
        }
    }
}
