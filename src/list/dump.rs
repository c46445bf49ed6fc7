// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::ArenaList;
use std::io::Write;

impl ArenaList {
    /// Writes a human readable table of every slot of the arena.
    ///
    /// For debugging only, the format is not stable.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an IO error occurs.
    pub fn dump<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "list: len={} capacity={} head={} tail={} free_head={} linear={}",
            self.len, self.slots.len(), self.head, self.tail, self.free_head, self.is_linear,
        )?;

        if self.released {
            return writeln!(writer, "  (destroyed)");
        }

        for (idx, slot) in self.slots.iter().enumerate() {
            match &slot.value {
                Some(value) => writeln!(
                    writer,
                    "  [{idx:>4}] prev={:<4} next={:<4} {:?}",
                    slot.prev,
                    slot.next,
                    String::from_utf8_lossy(value),
                )?,
                None => writeln!(writer, "  [{idx:>4}] free      next={:<4}", slot.next)?,
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for ArenaList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;

        for (pos, (_, value)) in self.iter().enumerate() {
            if pos > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", String::from_utf8_lossy(value))?;
        }

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn list_display_logical_order() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(4)?;
        let a = list.push_back(b"a")?;
        list.push_back(b"c")?;
        list.insert(a, b"b")?;

        assert_eq!("[a, b, c]", list.to_string());
        assert_eq!("[]", ArenaList::with_capacity(1)?.to_string());

        Ok(())
    }

    #[test]
    fn list_dump_lists_every_slot() -> crate::Result<()> {
        let mut list = ArenaList::with_capacity(3)?;
        list.push_back(b"hello")?;

        let mut out = Vec::new();
        list.dump(&mut out)?;

        let out = String::from_utf8_lossy(&out);
        assert_eq!(4, out.lines().count());
        assert!(out.contains("\"hello\""));
        assert!(out.contains("free"));

        Ok(())
    }
}
