// Licensed under the Apache-2.0 license

pub mod eeprom_test;
