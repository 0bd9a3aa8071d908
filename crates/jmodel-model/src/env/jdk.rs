//! A minimal JDK so that projects without a configured runtime still resolve `java.lang`.
//!
//! The declarations are kept as source text and bound like any other unit, but they are tagged
//! [`Origin::Binary`]: callers see them through binding-driven types, the same way they would
//! see classes read from a real runtime image.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::binding::Origin;

use super::state::SourceUnit;

const SOURCES: &[(&str, &str)] = &[
    (
        "java/lang/Object.java",
        r#"package java.lang;
public class Object {
    public Object() {}
    public final native Class<?> getClass();
    public native int hashCode();
    public boolean equals(Object obj) { return this == obj; }
    protected native Object clone() throws CloneNotSupportedException;
    public String toString() { return ""; }
}"#,
    ),
    (
        "java/lang/lang.java",
        r#"package java.lang;
public interface CharSequence {
    int length();
    char charAt(int index);
}
public interface Comparable<T> {
    int compareTo(T o);
}
public interface Iterable<T> {
    java.util.Iterator<T> iterator();
}
public interface Runnable {
    void run();
}
public interface Cloneable {}
public interface AutoCloseable {
    void close() throws Exception;
}
public final class String implements java.io.Serializable, Comparable<String>, CharSequence {
    public String() {}
    public int length() { return 0; }
    public char charAt(int index) { return 0; }
    public int compareTo(String other) { return 0; }
    public boolean isEmpty() { return true; }
}
public final class Class<T> implements java.io.Serializable {
    private Class() {}
    public String getName() { return null; }
}
public abstract class Enum<E extends Enum<E>> implements Comparable<E>, java.io.Serializable {
    protected Enum(String name, int ordinal) {}
    public final String name() { return null; }
    public final int ordinal() { return 0; }
    public final int compareTo(E o) { return 0; }
}
public abstract class Record {
    protected Record() {}
}
public abstract class Number implements java.io.Serializable {
    public Number() {}
    public abstract int intValue();
    public abstract long longValue();
    public abstract float floatValue();
    public abstract double doubleValue();
}
public final class Boolean implements java.io.Serializable, Comparable<Boolean> {
    public static final Boolean TRUE = null;
    public static final Boolean FALSE = null;
    public Boolean(boolean value) {}
    public int compareTo(Boolean other) { return 0; }
}
public final class Character implements java.io.Serializable, Comparable<Character> {
    public static final char MIN_VALUE = '\u0000';
    public static final char MAX_VALUE = '\uffff';
    public Character(char value) {}
    public int compareTo(Character other) { return 0; }
}
public final class Byte extends Number implements Comparable<Byte> {
    public static final byte MIN_VALUE = -128;
    public static final byte MAX_VALUE = 127;
    public static final int SIZE = 8;
    public Byte(byte value) {}
    public int compareTo(Byte other) { return 0; }
}
public final class Short extends Number implements Comparable<Short> {
    public static final short MIN_VALUE = -32768;
    public static final short MAX_VALUE = 32767;
    public Short(short value) {}
    public int compareTo(Short other) { return 0; }
}
public final class Integer extends Number implements Comparable<Integer> {
    public static final int MIN_VALUE = 0x80000000;
    public static final int MAX_VALUE = 0x7fffffff;
    public static final int SIZE = 32;
    public static final int BYTES = SIZE / Byte.SIZE;
    public Integer(int value) {}
    public int compareTo(Integer other) { return 0; }
}
public final class Long extends Number implements Comparable<Long> {
    public static final long MIN_VALUE = 0x8000000000000000L;
    public static final long MAX_VALUE = 0x7fffffffffffffffL;
    public static final int SIZE = 64;
    public Long(long value) {}
    public int compareTo(Long other) { return 0; }
}
public final class Float extends Number implements Comparable<Float> {
    public static final float MAX_VALUE = 3.4028235E38f;
    public static final float MIN_VALUE = 1.4E-45f;
    public static final float POSITIVE_INFINITY = 1.0f / 0.0f;
    public static final float NEGATIVE_INFINITY = -1.0f / 0.0f;
    public static final float NaN = 0.0f / 0.0f;
    public Float(float value) {}
    public int compareTo(Float other) { return 0; }
}
public final class Double extends Number implements Comparable<Double> {
    public static final double MAX_VALUE = 1.7976931348623157E308;
    public static final double MIN_VALUE = 4.9E-324;
    public static final double POSITIVE_INFINITY = 1.0 / 0.0;
    public static final double NEGATIVE_INFINITY = -1.0 / 0.0;
    public static final double NaN = 0.0d / 0.0;
    public Double(double value) {}
    public int compareTo(Double other) { return 0; }
}
public final class Void {
    private Void() {}
}
public final class Math {
    public static final double E = 2.718281828459045;
    public static final double PI = 3.141592653589793;
    private Math() {}
}
public class Throwable implements java.io.Serializable {
    public Throwable() {}
    public Throwable(String message) {}
    public String getMessage() { return null; }
}
public class Exception extends Throwable {
    public Exception() {}
    public Exception(String message) {}
}
public class RuntimeException extends Exception {
    public RuntimeException() {}
    public RuntimeException(String message) {}
}
public class Error extends Throwable {
    public Error() {}
}
public class CloneNotSupportedException extends Exception {
    public CloneNotSupportedException() {}
}
public class IllegalArgumentException extends RuntimeException {
    public IllegalArgumentException() {}
    public IllegalArgumentException(String message) {}
}
public class IllegalStateException extends RuntimeException {
    public IllegalStateException() {}
    public IllegalStateException(String message) {}
}
public class NullPointerException extends RuntimeException {
    public NullPointerException() {}
}
public class UnsupportedOperationException extends RuntimeException {
    public UnsupportedOperationException() {}
}
@java.lang.annotation.Documented
@java.lang.annotation.Retention(java.lang.annotation.RetentionPolicy.RUNTIME)
public @interface Deprecated {
    String since() default "";
    boolean forRemoval() default false;
}
@java.lang.annotation.Target(java.lang.annotation.ElementType.METHOD)
@java.lang.annotation.Retention(java.lang.annotation.RetentionPolicy.SOURCE)
public @interface Override {}
@java.lang.annotation.Documented
@java.lang.annotation.Retention(java.lang.annotation.RetentionPolicy.RUNTIME)
@java.lang.annotation.Target(java.lang.annotation.ElementType.TYPE)
public @interface FunctionalInterface {}
@java.lang.annotation.Retention(java.lang.annotation.RetentionPolicy.SOURCE)
public @interface SuppressWarnings {
    String[] value();
}
@java.lang.annotation.Documented
@java.lang.annotation.Retention(java.lang.annotation.RetentionPolicy.RUNTIME)
public @interface SafeVarargs {}
"#,
    ),
    (
        "java/lang/annotation/annotation.java",
        r#"package java.lang.annotation;
public interface Annotation {
    Class<? extends Annotation> annotationType();
}
public enum RetentionPolicy { SOURCE, CLASS, RUNTIME }
public enum ElementType {
    TYPE, FIELD, METHOD, PARAMETER, CONSTRUCTOR, LOCAL_VARIABLE, ANNOTATION_TYPE, PACKAGE,
    TYPE_PARAMETER, TYPE_USE, MODULE, RECORD_COMPONENT
}
@Documented
@Retention(RetentionPolicy.RUNTIME)
@Target(ElementType.ANNOTATION_TYPE)
public @interface Retention {
    RetentionPolicy value();
}
@Documented
@Retention(RetentionPolicy.RUNTIME)
@Target(ElementType.ANNOTATION_TYPE)
public @interface Target {
    ElementType[] value();
}
@Documented
@Retention(RetentionPolicy.RUNTIME)
@Target(ElementType.ANNOTATION_TYPE)
public @interface Documented {}
@Documented
@Retention(RetentionPolicy.RUNTIME)
@Target(ElementType.ANNOTATION_TYPE)
public @interface Inherited {}
@Documented
@Retention(RetentionPolicy.RUNTIME)
@Target(ElementType.ANNOTATION_TYPE)
public @interface Repeatable {
    Class<? extends Annotation> value();
}
"#,
    ),
    (
        "java/io/io.java",
        r#"package java.io;
public interface Serializable {}
public interface Closeable extends AutoCloseable {
    void close() throws IOException;
}
public class IOException extends Exception {
    public IOException() {}
    public IOException(String message) {}
}
"#,
    ),
    (
        "java/util/util.java",
        r#"package java.util;
public interface Iterator<E> {
    boolean hasNext();
    E next();
}
public interface Collection<E> extends Iterable<E> {
    int size();
    boolean isEmpty();
    boolean add(E e);
}
public interface List<E> extends Collection<E> {
    E get(int index);
}
public interface Set<E> extends Collection<E> {}
public interface Map<K, V> {
    int size();
    V get(Object key);
    V put(K key, V value);
    interface Entry<K, V> {
        K getKey();
        V getValue();
    }
}
public class ArrayList<E> implements List<E>, java.io.Serializable {
    public ArrayList() {}
    public int size() { return 0; }
    public boolean isEmpty() { return true; }
    public boolean add(E e) { return true; }
    public E get(int index) { return null; }
}
public class HashMap<K, V> implements Map<K, V>, java.io.Serializable {
    public HashMap() {}
    public int size() { return 0; }
    public V get(Object key) { return null; }
    public V put(K key, V value) { return null; }
}
public final class Optional<T> {
    private Optional() {}
    public T get() { return null; }
    public boolean isPresent() { return false; }
}
"#,
    ),
];

/// Parsed once per process and shared by every environment.
pub(crate) fn units() -> &'static [Arc<SourceUnit>] {
    static UNITS: OnceLock<Vec<Arc<SourceUnit>>> = OnceLock::new();
    UNITS.get_or_init(|| {
        SOURCES
            .iter()
            .map(|(path, text)| {
                let unit = SourceUnit::parse(
                    PathBuf::from("<jdk>").join(path),
                    text,
                    Origin::Binary,
                );
                debug_assert!(unit.errors.is_empty(), "{path}: {:?}", unit.errors);
                Arc::new(unit)
            })
            .collect()
    })
}
