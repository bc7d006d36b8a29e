
pub const MEM_SIZE: usize = 1 << 16; // Words

// Execution always begins here.
pub const PC_START: u16 = 0x3000;

// Everything at or above this address belongs to a peripheral.
pub const MMIO_START: u16 = 0xfe00;

// Keyboard status register; bit 15 means a character is waiting.
pub const KBSR: u16 = 0xfe00;

// Keyboard data register; holds the waiting character.
pub const KBDR: u16 = 0xfe02;
