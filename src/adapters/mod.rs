//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter          | Implements         | Connects to                    |
//! |------------------|--------------------|--------------------------------|
//! | `i2c_bus`        | BusPort            | Any embedded-hal blocking I2C  |
//! | `sim_bus`        | BusPort            | Simulated PCF8574 devices      |
//! | `expander_pins`  | PinPort            | Lines on expander devices      |
//! | `log_sink`       | SensorEventSink    | Logger output                  |
//! | `text_sink`      | SensorEventSink    | `<Q id>` lines on a text stream|
//! | `memory_store`   | StoragePort        | In-memory key-value store      |

pub mod expander_pins;
pub mod i2c_bus;
pub mod log_sink;
pub mod memory_store;
pub mod sim_bus;
pub mod text_sink;
