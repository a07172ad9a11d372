//! Permutations of finite sets.
use std::fmt;
use std::mem::replace;
use std::ops::Mul;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

use crate::action::LeftAction;
use crate::error::GroupError;
use crate::El;

/// A permutation of {0, ..., n-1}.
///
/// The number n is the degree of the permutation. Unlike a general bijection on all [`El`] values,
/// a `Perm` remembers its degree: every permutation in a group has the same degree and composing
/// permutations of different degree is a programming error. Applying a permutation to a point
/// outside of its domain leaves that point fixed.
///
/// Products are function composition, `(a * b)(x) = a(b(x))`, so in `a * b` the permutation `b`
/// is applied first.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Perm {
    images: Box<[El]>,
}

impl Perm {
    /// The identity permutation of a given degree.
    pub fn identity(degree: usize) -> Perm {
        assert!(degree <= El::MAX as usize);
        Perm {
            images: (0..degree as El).collect(),
        }
    }

    /// Create a permutation from a vector containing the images of 0..n.
    ///
    /// Returns None if the vector does not correspond to a permutation.
    pub fn from_vec(images: Vec<El>) -> Option<Perm> {
        Self::from_vec_with_scratch(images, &mut vec![])
    }

    /// Create a permutation from a vector containing the images of 0..n.
    ///
    /// Returns None if the vector does not correspond to a permutation.
    /// The last parameter is used as scratch space and will be overwritten.
    pub fn from_vec_with_scratch(images: Vec<El>, scratch: &mut Vec<bool>) -> Option<Perm> {
        // Having the degree be a valid El itself keeps point arithmetic overflow free
        assert!(images.len() <= El::MAX as usize);
        let seen = scratch;
        seen.clear();
        seen.resize(images.len(), false);

        for &image in images.iter() {
            let image = image as usize;
            if image >= images.len() || seen[image] {
                return None;
            }
            seen[image] = true;
        }

        Some(Perm {
            images: images.into_boxed_slice(),
        })
    }

    /// Wrap images already known to form a permutation, e.g. the result of composing two
    /// permutations.
    pub(crate) fn from_images_unchecked(images: Vec<El>) -> Perm {
        debug_assert!(Perm::from_vec(images.clone()).is_some());
        Perm {
            images: images.into_boxed_slice(),
        }
    }

    /// Create a permutation of a given degree from disjoint cycles.
    ///
    /// Returns None if a cycle mentions a point outside of the domain or the cycles overlap.
    pub fn from_cycles(degree: usize, cycles: &[&[El]]) -> Option<Perm> {
        let mut images: Vec<El> = (0..degree as El).collect();
        let mut touched = vec![false; degree];
        for cycle in cycles {
            for (pos, &el) in cycle.iter().enumerate() {
                let next = cycle[(pos + 1) % cycle.len()];
                if el as usize >= degree || replace(&mut touched[el as usize], true) {
                    return None;
                }
                images[el as usize] = next;
            }
        }
        Perm::from_vec(images)
    }

    /// Number of points this permutation acts on.
    pub fn degree(&self) -> usize {
        self.images.len()
    }

    /// The images of 0..n.
    pub fn as_slice(&self) -> &[El] {
        &self.images
    }

    /// The image of a single point.
    #[inline]
    pub fn image(&self, el: El) -> El {
        self.images.get(el as usize).copied().unwrap_or(el)
    }

    /// Whether this is the identity permutation.
    pub fn is_identity(&self) -> bool {
        self.images
            .iter()
            .enumerate()
            .all(|(i, &image)| i as El == image)
    }

    /// The smallest point not fixed by this permutation.
    pub fn smallest_moved_point(&self) -> Option<El> {
        self.smallest_moved_point_from(0)
    }

    /// The smallest point that is at least `start` and not fixed by this permutation.
    pub fn smallest_moved_point_from(&self, start: El) -> Option<El> {
        (start..self.degree() as El).find(|&el| self.image(el) != el)
    }

    /// All points not fixed by this permutation, in increasing order.
    pub fn support(&self) -> Vec<El> {
        (0..self.degree() as El)
            .filter(|&el| self.image(el) != el)
            .collect()
    }

    /// The inverse of this permutation.
    pub fn inverse(&self) -> Perm {
        let mut target = self.clone();
        self.inverse_into(&mut target);
        target
    }

    /// Store the inverse of this permutation in an existing permutation of the same degree.
    pub fn inverse_into(&self, target: &mut Perm) {
        assert_eq!(self.degree(), target.degree());
        for (i, &image) in self.images.iter().enumerate() {
            target.images[image as usize] = i as El;
        }
    }

    /// The composition `self * rhs`, applying `rhs` first.
    pub fn compose(&self, rhs: &Perm) -> Perm {
        self.left_apply(rhs.clone())
    }

    /// A power of this permutation.
    ///
    /// This implementation performs exponentiation by squaring and accepts negative exponents.
    pub fn pow<E>(&self, exponent: E) -> Perm
    where
        E: Integer + Clone,
    {
        let (mut square, mut exp) = if exponent < E::zero() {
            (self.inverse(), E::zero() - exponent)
        } else {
            (self.clone(), exponent)
        };

        let two = E::one() + E::one();
        let mut result = Perm::identity(self.degree());

        while !exp.is_zero() {
            let (half, bit) = exp.div_rem(&two);
            if !bit.is_zero() {
                result = &result * &square;
            }
            exp = half;
            if !exp.is_zero() {
                square = &square * &square;
            }
        }

        result
    }

    /// Conjugate of this permutation by another: `by * self * by⁻¹`.
    pub fn conjugate(&self, by: &Perm) -> Perm {
        &(by * self) * &by.inverse()
    }

    /// Commutator `self * other * self⁻¹ * other⁻¹`.
    pub fn commutator(&self, other: &Perm) -> Perm {
        &(&(self * other) * &self.inverse()) * &other.inverse()
    }

    /// Whether two permutations commute.
    pub fn commutes_with(&self, other: &Perm) -> bool {
        self * other == other * self
    }

    /// The order of this permutation as a group element.
    pub fn order(&self) -> BigUint {
        self.cycles()
            .map(|cycle| BigUint::from(cycle.count()))
            .fold(BigUint::one(), |acc, len| acc.lcm(&len))
    }

    /// Whether this permutation is a product of an even number of transpositions.
    pub fn is_even(&self) -> bool {
        // A k-cycle is a product of k - 1 transpositions
        self.cycles().map(|cycle| cycle.count() - 1).sum::<usize>() % 2 == 0
    }

    /// The lengths of all proper cycles, in order of their smallest point.
    pub fn cycle_lengths(&self) -> Vec<usize> {
        self.cycles().map(|cycle| cycle.count()).collect()
    }

    /// This permutation acting on the points `offset..offset + n` of a larger domain.
    ///
    /// Panics when the shifted permutation does not fit into `degree` points.
    pub fn shifted(&self, offset: usize, degree: usize) -> Perm {
        assert!(offset + self.degree() <= degree);
        let mut images: Vec<El> = (0..degree as El).collect();
        for (i, &image) in self.images.iter().enumerate() {
            images[offset + i] = offset as El + image;
        }
        Perm {
            images: images.into_boxed_slice(),
        }
    }

    /// Return the cycle starting at an element.
    ///
    /// Returns a 1-cycle when the element is not in the support of this permutation.
    pub fn cycle_at(&self, el: El) -> Cycle<'_> {
        Cycle {
            perm: self,
            pos: Some(el),
            start: el,
        }
    }

    /// Returns an iterator over all proper cycles of a permutation.
    ///
    /// The returned iterator does not produce any 1-cycles.
    pub fn cycles(&self) -> Cycles<'_> {
        self.cycles_with_scratch(Default::default())
    }

    /// Return an iterator over all proper cycles of a permutation. Use existing scratch space.
    ///
    /// The ownership of the scratch space is passed to the returned iterator and can be recovered
    /// by [`Cycles::into_scratch`].
    pub fn cycles_with_scratch(&self, mut scratch: Vec<bool>) -> Cycles<'_> {
        scratch.clear();
        scratch.resize(self.images.len(), false);
        Cycles {
            perm: self,
            seen: scratch,
            pos: 0,
        }
    }

    /// Emit this permutation to a [`Formatter`][fmt::Formatter]. Use existing scratch space.
    pub fn format_with_scratch(
        &self,
        f: &mut fmt::Formatter,
        scratch: &mut Vec<bool>,
    ) -> fmt::Result {
        let mut cycles = self.cycles_with_scratch(replace(scratch, Default::default()));

        let mut empty = true;

        for cycle in cycles.by_ref() {
            empty = false;
            fmt::Display::fmt(&cycle, f)?;
        }

        *scratch = cycles.into_scratch();

        if empty {
            f.write_str("()")?;
        }

        Ok(())
    }
}

impl From<Perm> for Vec<El> {
    fn from(perm: Perm) -> Vec<El> {
        perm.images.into_vec()
    }
}

impl TryFrom<Vec<El>> for Perm {
    type Error = GroupError;

    fn try_from(images: Vec<El>) -> Result<Perm, GroupError> {
        let degree = images.len();
        Perm::from_vec(images).ok_or(GroupError::InvalidPermutation { degree })
    }
}

impl<'a, 'b> Mul<&'b Perm> for &'a Perm {
    type Output = Perm;

    fn mul(self, rhs: &'b Perm) -> Perm {
        self.compose(rhs)
    }
}

impl Mul<Perm> for Perm {
    type Output = Perm;

    fn mul(self, mut rhs: Perm) -> Perm {
        self.left_apply_to(&mut rhs);
        rhs
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.format_with_scratch(f, &mut Default::default())
    }
}

impl fmt::Debug for Perm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.format_with_scratch(f, &mut Default::default())?;
        write!(f, " @ 0..{}", self.degree())
    }
}

/// Iterator over the elements of a permutation's cycle.
#[derive(Clone)]
pub struct Cycle<'a> {
    perm: &'a Perm,
    pos: Option<El>,
    start: El,
}

impl<'a> Iterator for Cycle<'a> {
    type Item = El;

    fn next(&mut self) -> Option<El> {
        self.pos.map(|pos| {
            let next = self.perm.image(pos);
            self.pos = if next == self.start { None } else { Some(next) };

            pos
        })
    }
}

impl<'a> fmt::Display for Cycle<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for el in self.clone() {
            f.write_str(if first { "(" } else { " " })?;
            first = false;
            fmt::Display::fmt(&el, f)?;
        }
        f.write_str(if first { "()" } else { ")" })
    }
}

impl<'a> fmt::Debug for Cycle<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Iterator over the cycles of a permutation.
#[derive(Clone)]
pub struct Cycles<'a> {
    perm: &'a Perm,
    seen: Vec<bool>,
    pos: El,
}

impl<'a> Cycles<'a> {
    /// Recover the scratch space needed for efficient iteration over the cycles of a permutation.
    pub fn into_scratch(self) -> Vec<bool> {
        self.seen
    }
}

impl<'a> Iterator for Cycles<'a> {
    type Item = Cycle<'a>;

    fn next(&mut self) -> Option<Cycle<'a>> {
        loop {
            if self.pos as usize >= self.perm.degree() {
                return None;
            } else if self.seen[self.pos as usize] || self.perm.image(self.pos) == self.pos {
                self.pos += 1;
            } else {
                let cycle = self.perm.cycle_at(self.pos);
                for el in cycle.clone() {
                    self.seen[el as usize] = true;
                }
                return Some(cycle);
            }
        }
    }
}
