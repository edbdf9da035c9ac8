/// Hardware resources that can be unavailable during activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    /// The PCI function is not an ICH7 LPC bridge.
    UnsupportedDevice,
    /// The PCI function could not be enabled.
    EnableFailed,
    /// `GPIO_CTRL` reports the GPIO block as disabled.
    GpioDisabled,
    /// A PCI config read failed.
    ConfigRead,
    /// The GPIO port range is already claimed.
    RegionBusy,
}

/// Named entities an instruction can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Entity {
    Register,
    Led,
    Behavior,
}

/// Bounded pools that can run out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pool {
    /// Every LED slot is allocated.
    LedSlots,
    /// A behavior's command table is full.
    CommandSlots,
}

/// Errors that can occur while driving the GPIO block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// Probing or claiming the hardware failed.
    ResourceUnavailable(Resource),
    /// A named register, LED or behavior does not exist.
    NotFound(Entity),
    /// An LED with that name already exists.
    AlreadyExists,
    /// An LED pool or command table is full.
    CapacityExceeded(Pool),
    /// Bit index or bit value out of range.
    InvalidArgument,
    /// Unknown verb or wrong argument count.
    MalformedInput,
    /// The device layer refused to register an LED.
    RegistrationFailed,
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Resource::UnsupportedDevice => write!(f, "device is not an ICH7 LPC bridge"),
            Resource::EnableFailed => write!(f, "device could not be enabled"),
            Resource::GpioDisabled => write!(f, "LPC GPIO block has not been enabled"),
            Resource::ConfigRead => write!(f, "unable to read PCI config space"),
            Resource::RegionBusy => write!(f, "unable to reserve GPIO I/O addresses"),
        }
    }
}

impl core::fmt::Display for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Entity::Register => write!(f, "register"),
            Entity::Led => write!(f, "led"),
            Entity::Behavior => write!(f, "command"),
        }
    }
}

impl core::fmt::Display for GpioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GpioError::ResourceUnavailable(r) => write!(f, "resource unavailable: {r}"),
            GpioError::NotFound(e) => write!(f, "{e} not found"),
            GpioError::AlreadyExists => write!(f, "led already exists"),
            GpioError::CapacityExceeded(Pool::LedSlots) => write!(f, "no more free led slots"),
            GpioError::CapacityExceeded(Pool::CommandSlots) => {
                write!(f, "no more free command slots")
            }
            GpioError::InvalidArgument => write!(f, "bit index or value out of range"),
            GpioError::MalformedInput => write!(f, "malformed instruction"),
            GpioError::RegistrationFailed => write!(f, "led registration failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn display_messages() {
        assert_eq!(GpioError::NotFound(Entity::Led).to_string(), "led not found");
        assert_eq!(
            GpioError::CapacityExceeded(Pool::CommandSlots).to_string(),
            "no more free command slots"
        );
        assert_eq!(
            GpioError::ResourceUnavailable(Resource::GpioDisabled).to_string(),
            "resource unavailable: LPC GPIO block has not been enabled"
        );
        assert_eq!(GpioError::AlreadyExists.to_string(), "led already exists");
    }
}
