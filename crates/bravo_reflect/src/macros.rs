/// Implements [`Record`](crate::Record) and [`FieldValue`](crate::FieldValue)
/// for a plain struct.
///
/// Fields are listed in native order. A field can be exposed under another
/// name with `field as "name"`; that name is what schemas match against.
///
/// The type must implement [`Default`], which is how a nested record is
/// materialised from decoded fields.
///
/// # Examples
///
/// ```
/// use bravo_reflect::{Record, Value, impl_record};
///
/// #[derive(Default)]
/// struct Student {
///     name: String,
///     math_score: i32,
/// }
///
/// impl_record!(Student {
///     name,
///     math_score as "mathScore",
/// });
///
/// let mut student = Student { name: "dancer".into(), math_score: 35 };
/// let record: &mut dyn Record = &mut student;
///
/// assert_eq!(record.field_names(), ["name", "mathScore"]);
/// assert_eq!(record.index_of("mathScore"), Some(1));
/// assert_eq!(record.field_at(1), Some(Value::Int(35)));
///
/// record.set_field_at(1, Value::Int(40)).unwrap();
/// assert_eq!(student.math_score, 40);
/// ```
#[macro_export]
macro_rules! impl_record {
    (@name $field:ident) => {
        ::core::stringify!($field)
    };
    (@name $field:ident $name:literal) => {
        $name
    };
    ($ty:ident { $($field:ident $(as $name:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            #[inline]
            fn record_name() -> &'static str {
                ::core::stringify!($ty)
            }

            #[inline]
            fn type_name(&self) -> &'static str {
                <Self as $crate::Record>::record_name()
            }

            #[inline]
            fn field_names(&self) -> &'static [&'static str] {
                &[$($crate::impl_record!(@name $field $($name)?)),*]
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field_at(&self, index: usize) -> ::core::option::Option<$crate::Value<'_>> {
                let mut i = 0_usize;
                $(
                    if index == i {
                        return ::core::option::Option::Some(
                            $crate::FieldValue::to_value(&self.$field),
                        );
                    }
                    i += 1;
                )*
                ::core::option::Option::None
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn set_field_at(
                &mut self,
                index: usize,
                value: $crate::Value<'_>,
            ) -> ::core::result::Result<(), $crate::ReflectError> {
                let mut i = 0_usize;
                $(
                    if index == i {
                        self.$field = $crate::FieldValue::from_value(value).map_err(|err| {
                            err.in_field(
                                ::core::stringify!($ty),
                                $crate::impl_record!(@name $field $($name)?),
                            )
                        })?;
                        return ::core::result::Result::Ok(());
                    }
                    i += 1;
                )*
                ::core::result::Result::Err($crate::ReflectError::IndexOutOfRange {
                    record: ::core::stringify!($ty),
                    index,
                    len: i,
                })
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn record_at_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn $crate::Record> {
                let mut i = 0_usize;
                $(
                    if index == i {
                        return $crate::FieldValue::as_record_mut(&mut self.$field);
                    }
                    i += 1;
                )*
                ::core::option::Option::None
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl $crate::FieldValue for $ty {
            #[inline]
            fn to_value(&self) -> $crate::Value<'_> {
                $crate::Value::Record(self)
            }

            fn from_value(
                value: $crate::Value<'_>,
            ) -> ::core::result::Result<Self, $crate::ReflectError> {
                let mut record = <$ty as ::core::default::Default>::default();
                $crate::apply_fields(&mut record, value)?;
                ::core::result::Result::Ok(record)
            }

            #[inline]
            fn as_record_mut(&mut self) -> ::core::option::Option<&mut dyn $crate::Record> {
                ::core::option::Option::Some(self)
            }
        }
    };
}
