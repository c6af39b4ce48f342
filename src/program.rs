//! # Program Model
//!
//! The assembler's output: a sparse binary image plus the symbol, alias and
//! relocation tables that describe it. A [`Program`] owns its symbols and
//! relocations; relocations point back at symbols through weak handles so
//! the reference graph has no strong cycle.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use thiserror::Error;

/// 16-bit flat address.
pub type Address = u16;

/// Signed 8-bit branch displacement.
pub type NearOffset = i8;

/// Fill pattern used when a sparse image is materialized densely and for
/// freshly powered-on RAM.
pub const FILL_BYTE: u8 = 0x55;

/// Compute the signed 8-bit displacement of a relative jump.
///
/// `position` is the address of the byte *after* the branch operand (the
/// address the CPU has reached when it applies the offset). Returns `None`
/// when the displacement does not fit in a signed byte.
///
/// # Examples
///
/// ```
/// use emu6502::program::relative_jump_offset;
///
/// // BNE at 0x1001 targeting 0x1000: operand at 0x1002, next byte 0x1003
/// assert_eq!(relative_jump_offset(0x1003, 0x1000), Some(-3));
/// assert_eq!(relative_jump_offset(0x1000, 0x1080), None);
/// ```
pub fn relative_jump_offset(position: Address, target: Address) -> Option<NearOffset> {
    let displacement = i32::from(target) - i32::from(position);
    i8::try_from(displacement).ok()
}

/// Attempt to write a byte over an address that already holds one, without
/// the overwrite flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address {address:#06x} already holds a byte")]
pub struct OverwriteError {
    pub address: Address,
}

/// Sparse mapping from address to byte.
///
/// Absent entries are undefined; [`SparseBinaryCode::dump_memory`] fills
/// them with [`FILL_BYTE`]. Writes refuse to clobber populated addresses
/// unless the overwrite flag is passed — ordinary emission must never
/// silently overlap, while relocation patches rewrite placeholders on
/// purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseBinaryCode {
    sparse_map: BTreeMap<Address, u8>,
}

impl SparseBinaryCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an image from a contiguous byte run.
    pub fn with_bytes(base_address: Address, bytes: &[u8]) -> Self {
        let mut code = Self::new();
        // A fresh map cannot collide
        let _ = code.put_bytes(base_address, bytes, false);
        code
    }

    /// Insert one byte.
    pub fn put_byte(
        &mut self,
        address: Address,
        byte: u8,
        overwrite: bool,
    ) -> Result<(), OverwriteError> {
        if !overwrite && self.sparse_map.contains_key(&address) {
            return Err(OverwriteError { address });
        }
        self.sparse_map.insert(address, byte);
        Ok(())
    }

    /// Insert a byte run starting at `address`. Addresses wrap at 0xFFFF.
    pub fn put_bytes(
        &mut self,
        address: Address,
        bytes: &[u8],
        overwrite: bool,
    ) -> Result<(), OverwriteError> {
        for (index, byte) in bytes.iter().enumerate() {
            self.put_byte(address.wrapping_add(index as Address), *byte, overwrite)?;
        }
        Ok(())
    }

    pub fn get(&self, address: Address) -> Option<u8> {
        self.sparse_map.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.sparse_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparse_map.is_empty()
    }

    /// Iterate populated `(address, byte)` pairs in address order.
    pub fn iter(&self) -> impl Iterator<Item = (Address, u8)> + '_ {
        self.sparse_map.iter().map(|(a, b)| (*a, *b))
    }

    /// `[min, max]` populated range, or `None` for an empty image.
    pub fn code_range(&self) -> Option<(Address, Address)> {
        let min = self.sparse_map.keys().next()?;
        let max = self.sparse_map.keys().next_back()?;
        Some((*min, *max))
    }

    /// Materialize the populated range as a dense byte vector, gaps filled
    /// with [`FILL_BYTE`]. The vector starts at the lowest populated
    /// address.
    pub fn dump_memory(&self) -> Vec<u8> {
        let Some((min, max)) = self.code_range() else {
            return Vec::new();
        };
        let mut dense = vec![FILL_BYTE; (max - min) as usize + 1];
        for (address, byte) in self.iter() {
            dense[(address - min) as usize] = byte;
        }
        dense
    }

    /// Render the image as hex-dump text, 16 bytes per row, with `--` for
    /// unpopulated cells.
    pub fn hex_dump(&self, line_prefix: &str) -> String {
        let Some((min, max)) = self.code_range() else {
            return String::new();
        };
        let mut out = String::new();
        let mut row = min & !0xF;
        loop {
            let populated = (0..16).any(|i| self.get(row + i).is_some());
            if populated {
                let _ = write!(out, "{line_prefix}{row:04x}:");
                for i in 0..16 {
                    match self.get(row + i) {
                        Some(byte) => {
                            let _ = write!(out, " {byte:02x}");
                        }
                        None => out.push_str(" --"),
                    }
                }
                out.push('\n');
            }
            match row.checked_add(16) {
                Some(next) if next <= max => row = next,
                _ => break,
            }
        }
        out
    }
}

/// Logical region tag attached to symbols; guides operand size selection
/// (zero-page vs absolute) for symbol references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segment {
    #[default]
    Unknown,
    ZeroPage,
    Code,
    Data,
    RoData,
    AbsoluteAddress,
}

/// How a relocation rewrites its patch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelocationMode {
    /// Two bytes, little-endian target address.
    Absolute,
    /// One byte, signed displacement from the byte after the operand.
    Relative,
    /// One byte, low byte of the target; the high byte must be zero.
    ZeroPage,
}

impl RelocationMode {
    /// Number of bytes rewritten at the patch site.
    pub fn size(self) -> u8 {
        match self {
            RelocationMode::Absolute => 2,
            RelocationMode::Relative | RelocationMode::ZeroPage => 1,
        }
    }
}

/// One symbol in the program.
///
/// A symbol is *defined* once `offset` is set; until then it is an
/// imported / forward reference. `references` tracks every relocation that
/// depends on this symbol so they can be patched when the symbol is
/// defined.
#[derive(Debug, Default)]
pub struct SymbolInfo {
    pub name: String,
    pub offset: Option<Address>,
    pub imported: bool,
    pub segment: Segment,
    /// Source line where the symbol was defined or first referenced.
    pub line: usize,
    pub references: Vec<Weak<RelocationInfo>>,
}

impl PartialEq for SymbolInfo {
    fn eq(&self, other: &Self) -> bool {
        // The reference list is bookkeeping, not identity
        self.name == other.name
            && self.offset == other.offset
            && self.imported == other.imported
            && self.segment == other.segment
    }
}

/// A record that bytes at `position` depend on a symbol's final address.
///
/// Relocations are kept in the program's ordered set even after being
/// patched, so a linker or dumper can re-emit them.
#[derive(Debug)]
pub struct RelocationInfo {
    pub target_symbol: Weak<RefCell<SymbolInfo>>,
    pub position: Address,
    pub mode: RelocationMode,
}

impl PartialEq for RelocationInfo {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.mode == other.mode
    }
}

impl Eq for RelocationInfo {}

impl PartialOrd for RelocationInfo {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelocationInfo {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position
            .cmp(&other.position)
            .then(self.mode.cmp(&other.mode))
    }
}

/// Named byte sequence substituted textually at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueAlias {
    pub name: String,
    pub value: Vec<u8>,
}

/// Assembler output: the sparse image plus symbol, alias and relocation
/// tables.
#[derive(Debug, Default)]
pub struct Program {
    pub sparse_binary_code: SparseBinaryCode,
    pub symbols: HashMap<String, Rc<RefCell<SymbolInfo>>>,
    pub aliases: HashMap<String, Rc<ValueAlias>>,
    pub relocations: BTreeSet<Rc<RelocationInfo>>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, symbol: SymbolInfo) -> Rc<RefCell<SymbolInfo>> {
        let name = symbol.name.clone();
        let shared = Rc::new(RefCell::new(symbol));
        self.symbols.insert(name, shared.clone());
        shared
    }

    pub fn find_symbol(&self, name: &str) -> Option<Rc<RefCell<SymbolInfo>>> {
        self.symbols.get(name).cloned()
    }

    pub fn add_alias(&mut self, alias: ValueAlias) -> Rc<ValueAlias> {
        let name = alias.name.clone();
        let shared = Rc::new(alias);
        self.aliases.insert(name, shared.clone());
        shared
    }

    pub fn find_alias(&self, name: &str) -> Option<Rc<ValueAlias>> {
        self.aliases.get(name).cloned()
    }

    /// Address of a defined symbol, if present and defined.
    pub fn symbol_offset(&self, name: &str) -> Option<Address> {
        self.find_symbol(name).and_then(|s| s.borrow().offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_byte_rejects_silent_overwrite() {
        let mut code = SparseBinaryCode::new();
        code.put_byte(0x1000, 0xAA, false).unwrap();

        let err = code.put_byte(0x1000, 0xBB, false).unwrap_err();
        assert_eq!(err, OverwriteError { address: 0x1000 });
        assert_eq!(code.get(0x1000), Some(0xAA));

        // Explicit overwrite rewrites the placeholder
        code.put_byte(0x1000, 0xBB, true).unwrap();
        assert_eq!(code.get(0x1000), Some(0xBB));
    }

    #[test]
    fn test_put_bytes_and_range() {
        let mut code = SparseBinaryCode::new();
        code.put_bytes(0x2000, &[0x01, 0x02, 0x03], false).unwrap();
        code.put_byte(0x1FF0, 0xFF, false).unwrap();

        assert_eq!(code.code_range(), Some((0x1FF0, 0x2002)));
        assert_eq!(code.len(), 4);
    }

    #[test]
    fn test_dump_memory_fills_gaps() {
        let mut code = SparseBinaryCode::new();
        code.put_byte(0x10, 0x01, false).unwrap();
        code.put_byte(0x13, 0x02, false).unwrap();

        assert_eq!(code.dump_memory(), vec![0x01, FILL_BYTE, FILL_BYTE, 0x02]);
    }

    #[test]
    fn test_put_bytes_wraps_address_space() {
        let mut code = SparseBinaryCode::new();
        code.put_bytes(0xFFFF, &[0x11, 0x22], false).unwrap();
        assert_eq!(code.get(0xFFFF), Some(0x11));
        assert_eq!(code.get(0x0000), Some(0x22));
    }

    #[test]
    fn test_hex_dump_marks_gaps() {
        let mut code = SparseBinaryCode::new();
        code.put_byte(0x0000, 0xEA, false).unwrap();
        code.put_byte(0x0002, 0x42, false).unwrap();

        let dump = code.hex_dump("");
        assert!(dump.starts_with("0000: ea -- 42 --"));
    }

    #[test]
    fn test_relative_jump_offset() {
        // Branch to self: operand at P+1, next byte P+2, target P
        assert_eq!(relative_jump_offset(0x1002, 0x1000), Some(-2));
        // Forward over one byte
        assert_eq!(relative_jump_offset(0x0002, 0x0003), Some(1));
        // Extremes of the reachable window
        assert_eq!(relative_jump_offset(0x1000, 0x1000 - 128), Some(-128));
        assert_eq!(relative_jump_offset(0x1000, 0x1000 + 127), Some(127));
        assert_eq!(relative_jump_offset(0x1000, 0x1000 + 128), None);
    }

    #[test]
    fn test_relocation_ordering() {
        let a = Rc::new(RelocationInfo {
            target_symbol: Weak::new(),
            position: 0x1000,
            mode: RelocationMode::Relative,
        });
        let b = Rc::new(RelocationInfo {
            target_symbol: Weak::new(),
            position: 0x1000,
            mode: RelocationMode::Absolute,
        });
        let c = Rc::new(RelocationInfo {
            target_symbol: Weak::new(),
            position: 0x0800,
            mode: RelocationMode::ZeroPage,
        });

        let set: BTreeSet<_> = [a.clone(), b.clone(), c.clone()].into_iter().collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered, vec![c, b, a]);
    }

    #[test]
    fn test_relocation_mode_sizes() {
        assert_eq!(RelocationMode::Absolute.size(), 2);
        assert_eq!(RelocationMode::Relative.size(), 1);
        assert_eq!(RelocationMode::ZeroPage.size(), 1);
    }

    #[test]
    fn test_program_symbol_and_alias_lookup() {
        let mut program = Program::new();
        program.add_symbol(SymbolInfo {
            name: "START".into(),
            offset: Some(0x2000),
            ..SymbolInfo::default()
        });
        program.add_alias(ValueAlias {
            name: "MAGIC".into(),
            value: vec![0x42],
        });

        assert_eq!(program.symbol_offset("START"), Some(0x2000));
        assert!(program.find_symbol("MISSING").is_none());
        assert_eq!(program.find_alias("MAGIC").unwrap().value, vec![0x42]);
    }
}
