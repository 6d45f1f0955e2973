//! Human-readable symbol listing.

use crate::scope::ScopeTable;
use crate::symbol::Symbol;
use std::fmt;
use std::io;

pub const LISTING_HEADER: &str = "Name  Scope  Loc  V/P/F  Array?  ArrSize  Type  Line Numbers";
const LISTING_RULE: &str = "------------------------------------------------------------";

/// Display adapter printing every symbol, scope by scope, in creation order.
pub struct SymbolListing<'t> {
    table: &'t ScopeTable,
}

impl<'t> SymbolListing<'t> {
    pub fn new(table: &'t ScopeTable) -> Self {
        Self { table }
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, symbol: &Symbol) -> fmt::Result {
    write!(
        f,
        "{:<4} {:<5}  {:<3}  {:<5}  ",
        symbol.name,
        symbol.scope.0,
        symbol.offset,
        symbol.role.label()
    )?;
    if symbol.is_array() {
        let size = symbol
            .value_kind
            .array_size()
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        write!(f, "{:<5}  {:<7}  ", "Array", size)?;
    } else {
        write!(f, "{:<5}  {:<7}  ", "No", "-")?;
    }
    write!(f, "{:<4}  ", symbol.value_kind.label())?;
    for line in &symbol.lines {
        write!(f, "{:>4} ", line)?;
    }
    writeln!(f)
}

impl fmt::Display for SymbolListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", LISTING_HEADER)?;
        writeln!(f, "{}", LISTING_RULE)?;
        for scope in self.table.scopes() {
            for symbol in self.table.symbols_in(scope.id) {
                write_row(f, symbol)?;
            }
        }
        Ok(())
    }
}

impl ScopeTable {
    pub fn listing(&self) -> SymbolListing<'_> {
        SymbolListing::new(self)
    }

    /// Print the symbol listing to `sink`.
    pub fn write_listing<W: io::Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        write!(sink, "{}", self.listing())
    }
}
