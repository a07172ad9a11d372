//! Group actions.
//!
//! Permutations act on single points, on tuples of points (pointwise) and on other permutations
//! (by composition). The orbit machinery uses these actions for every orbit mode, and the chain
//! algorithms use the in-place variants to avoid allocating intermediate permutations.
use crate::perm::Perm;
use crate::El;

/// Left action on `T`.
///
/// Elements of implementing types act on `T` values on the left.
pub trait LeftAction<T>
where
    T: ?Sized,
{
    /// Type of scratch space needed to perform group action.
    type Scratch: Default;

    /// Act on a value on the left.
    fn left_apply(&self, value: T) -> T
    where
        T: Sized,
    {
        self.left_apply_with_scratch(value, &mut Self::Scratch::default())
    }

    /// Act on a value on the left. Use existing scratch space.
    fn left_apply_with_scratch(&self, mut value: T, scratch: &mut Self::Scratch) -> T
    where
        T: Sized,
    {
        self.left_apply_to_with_scratch(&mut value, scratch);
        value
    }

    /// Act on a value, in place, on the left.
    fn left_apply_to(&self, value: &mut T) {
        self.left_apply_to_with_scratch(value, &mut Self::Scratch::default())
    }

    /// Act on a value, in place, on the left. Use existing scratch space.
    fn left_apply_to_with_scratch(&self, value: &mut T, scratch: &mut Self::Scratch);
}

/// Right action on `T`.
///
/// Elements of implementing types act on `T` values on the right.
pub trait RightAction<T>
where
    T: ?Sized,
{
    /// Type of scratch space needed to perform group action.
    type Scratch: Default;

    /// Act on a value on the right.
    fn right_apply(&self, value: T) -> T
    where
        T: Sized,
    {
        self.right_apply_with_scratch(value, &mut Self::Scratch::default())
    }

    /// Act on a value on the right. Use existing scratch space.
    fn right_apply_with_scratch(&self, mut value: T, scratch: &mut Self::Scratch) -> T
    where
        T: Sized,
    {
        self.right_apply_to_with_scratch(&mut value, scratch);
        value
    }

    /// Act on a value, in place, on the right.
    fn right_apply_to(&self, value: &mut T) {
        self.right_apply_to_with_scratch(value, &mut Self::Scratch::default())
    }

    /// Act on a value, in place, on the right. Use existing scratch space.
    fn right_apply_to_with_scratch(&self, value: &mut T, scratch: &mut Self::Scratch);
}

/// Application of a permutation to a point.
impl LeftAction<El> for Perm {
    type Scratch = ();

    fn left_apply_to_with_scratch(&self, el: &mut El, _: &mut ()) {
        *el = self.image(*el);
    }
}

/// Pointwise application of a permutation to a tuple of points.
///
/// This is the action used for orbits of tuples. Orbits of sets use the same action followed by
/// sorting.
impl LeftAction<[El]> for Perm {
    type Scratch = ();

    fn left_apply_to_with_scratch(&self, tuple: &mut [El], _: &mut ()) {
        for el in tuple.iter_mut() {
            *el = self.image(*el);
        }
    }
}

/// Composition of a permutation on the left: `target` becomes `self * target`.
///
/// Unlike composition on the right, this requires no scratch space.
impl LeftAction<Perm> for Perm {
    type Scratch = ();

    fn left_apply_to_with_scratch(&self, target: &mut Perm, _: &mut ()) {
        assert_eq!(self.degree(), target.degree());
        let mut images: Vec<El> = std::mem::replace(target, Perm::identity(0)).into();
        self.left_apply_to(&mut images[..]);
        *target = Perm::from_images_unchecked(images);
    }
}

/// Composition of a permutation on the right: `target` becomes `target * self`.
///
/// This needs a copy of the target's images as scratch space.
impl RightAction<Perm> for Perm {
    type Scratch = Vec<El>;

    fn right_apply_to_with_scratch(&self, target: &mut Perm, scratch: &mut Vec<El>) {
        assert_eq!(self.degree(), target.degree());
        scratch.clear();
        scratch.extend_from_slice(target.as_slice());
        let mut images: Vec<El> = std::mem::replace(target, Perm::identity(0)).into();
        for (image, &el) in images.iter_mut().zip(self.as_slice()) {
            *image = scratch[el as usize];
        }
        *target = Perm::from_images_unchecked(images);
    }
}
