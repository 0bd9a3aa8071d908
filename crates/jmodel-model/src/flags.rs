//! Modifier sets shared by source and binary declarations.
//!
//! The low bits reuse the class-file `ACC_*` values; source-only modifiers and the binder's
//! own markers live above bit 16.

use std::fmt;

use jmodel_classfile::access;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const PUBLIC: Modifiers = Modifiers(access::ACC_PUBLIC as u32);
    pub const PRIVATE: Modifiers = Modifiers(access::ACC_PRIVATE as u32);
    pub const PROTECTED: Modifiers = Modifiers(access::ACC_PROTECTED as u32);
    pub const STATIC: Modifiers = Modifiers(access::ACC_STATIC as u32);
    pub const FINAL: Modifiers = Modifiers(access::ACC_FINAL as u32);
    pub const SYNCHRONIZED: Modifiers = Modifiers(access::ACC_SYNCHRONIZED as u32);
    pub const VOLATILE: Modifiers = Modifiers(access::ACC_VOLATILE as u32);
    pub const TRANSIENT: Modifiers = Modifiers(access::ACC_TRANSIENT as u32);
    pub const NATIVE: Modifiers = Modifiers(access::ACC_NATIVE as u32);
    pub const ABSTRACT: Modifiers = Modifiers(access::ACC_ABSTRACT as u32);
    pub const STRICTFP: Modifiers = Modifiers(access::ACC_STRICT as u32);
    pub const SYNTHETIC: Modifiers = Modifiers(access::ACC_SYNTHETIC as u32);
    pub const BRIDGE: Modifiers = Modifiers(1 << 16);
    pub const DEFAULT: Modifiers = Modifiers(1 << 17);
    pub const SEALED: Modifiers = Modifiers(1 << 18);
    pub const NON_SEALED: Modifiers = Modifiers(1 << 19);
    /// Declared implicitly by the binder (default constructors, enum `values`/`valueOf`).
    pub const GENERATED: Modifiers = Modifiers(1 << 20);

    const KEYWORDS: &'static [(Modifiers, &'static str)] = &[
        (Modifiers::PUBLIC, "public"),
        (Modifiers::PROTECTED, "protected"),
        (Modifiers::PRIVATE, "private"),
        (Modifiers::ABSTRACT, "abstract"),
        (Modifiers::DEFAULT, "default"),
        (Modifiers::STATIC, "static"),
        (Modifiers::SEALED, "sealed"),
        (Modifiers::NON_SEALED, "non-sealed"),
        (Modifiers::FINAL, "final"),
        (Modifiers::TRANSIENT, "transient"),
        (Modifiers::VOLATILE, "volatile"),
        (Modifiers::SYNCHRONIZED, "synchronized"),
        (Modifiers::NATIVE, "native"),
        (Modifiers::STRICTFP, "strictfp"),
    ];

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Modifiers(bits)
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Modifiers) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Modifiers) -> Self {
        Modifiers(self.0 | other.0)
    }

    pub const fn without(self, other: Modifiers) -> Self {
        Modifiers(self.0 & !other.0)
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_public(self) -> bool {
        self.contains(Modifiers::PUBLIC)
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Modifiers::ABSTRACT)
    }

    /// Compiler-generated: synthetic, bridge, or declared implicitly.
    pub fn is_generated(self) -> bool {
        self.intersects(Modifiers::SYNTHETIC.union(Modifiers::BRIDGE).union(Modifiers::GENERATED))
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::KEYWORDS
            .iter()
            .find(|(_, text)| *text == keyword)
            .map(|(flag, _)| *flag)
    }

    /// Source keywords in canonical order (`public static final`).
    pub fn keywords(self) -> Vec<&'static str> {
        Self::KEYWORDS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, text)| *text)
            .collect()
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.insert(rhs);
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keywords().join(" "))
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifiers({:#x}: {})", self.0, self)
    }
}
