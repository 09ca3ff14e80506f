use std::cell::RefCell;
use std::rc::Rc;

use imago_core::{well_known, EvalContext, ImagoError, Value};

/// One pass of whole-tree macro rewriting, counting rewrites into `cnt`.
///
/// A non-empty list whose head symbol is bound anywhere in the chain to
/// a list headed `macro` is replaced by applying that macro to the
/// unevaluated tail. `quote` blocks descent into its argument. The
/// caller re-enters until a pass makes zero rewrites.
pub fn expand(ctx: &EvalContext, form: &mut Value, mut cnt: usize) -> Result<usize, ImagoError> {
    let wk = well_known();
    let Some(list) = form.as_list().cloned() else {
        return Ok(cnt);
    };
    let head = {
        let b = list.borrow();
        match b.first() {
            None => return Ok(cnt),
            Some(h) => h.clone(),
        }
    };
    if let Some(s) = head.as_spur() {
        if s == wk.quote {
            return Ok(cnt);
        }
        if let Some(binding) = ctx.lookup(s) {
            let is_macro = binding.as_list().is_some_and(|mac| {
                matches!(mac.borrow().first().and_then(|v| v.as_spur()), Some(m) if m == wk.macro_)
            });
            if is_macro {
                let args: Vec<Value> = list.borrow()[1..].to_vec();
                *form = ctx.apply(&binding, args)?;
                return Ok(cnt + 1);
            }
        }
    }
    cnt = descend(ctx, &list, cnt)?;
    Ok(cnt)
}

fn descend(
    ctx: &EvalContext,
    list: &Rc<RefCell<Vec<Value>>>,
    mut cnt: usize,
) -> Result<usize, ImagoError> {
    let mut i = 0;
    loop {
        let elem = { list.borrow().get(i).cloned() };
        let Some(mut elem) = elem else {
            return Ok(cnt);
        };
        cnt = expand(ctx, &mut elem, cnt)?;
        if let Some(slot) = list.borrow_mut().get_mut(i) {
            *slot = elem;
        }
        i += 1;
    }
}
