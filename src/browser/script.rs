//! Playwright scripts generated for Node.js
//!
//! Each script is a fixed template with its arguments injected as one JSON
//! literal, so no user-supplied value is ever spliced into JavaScript source.

use serde::Serialize;

use super::detect::SUCCESS_TEXT;
use super::BrowserOptions;
use crate::error::MeterResult;
use crate::models::FormFields;

/// Marker printed on stdout before the JSON result
pub const RESULT_MARKER: &str = "---RESULT---";

/// A form target is accepted once this many fields were written
pub const MIN_FILLED_FIELDS: u32 = 2;

const ARGS_PLACEHOLDER: &str = "__ARGS__";

/// Shadow-root aware fill routine, evaluated inside the page or a frame
const FILL_FORM_JS: &str = r##"
const FILL_FORM = (args) => {
  function createEvent(type) {
    return new Event(type, { bubbles: true });
  }
  function findAndFill(root, depth) {
    if (!root || depth > 25) return { filled: 0, submit: null };
    const acc = root.querySelector('input[name="input-account"]')
      || (root.getElementById ? root.getElementById('input-account') : null);
    if (acc) {
      const container = acc.closest('form') || acc.closest('div') || root;
      let filled = 0;
      container.querySelectorAll('input[name], select[name], input[id]').forEach(el => {
        const name = el.getAttribute('name');
        const id = el.id || '';
        const val = (name && args[name] !== undefined ? String(args[name]) : null)
          || (id && args[id] !== undefined ? String(args[id]) : null);
        if (val !== null && val !== '') {
          el.value = val;
          el.dispatchEvent(createEvent('input'));
          el.dispatchEvent(createEvent('change'));
          filled++;
        }
      });
      const submit = container.querySelector('button[type=submit]');
      return { filled, submit };
    }
    const list = root.querySelectorAll('*');
    for (let i = 0; i < list.length; i++) {
      const el = list[i];
      if (el.shadowRoot) {
        const r = findAndFill(el.shadowRoot, depth + 1);
        if (r.filled > 0) return r;
      }
    }
    return { filled: 0, submit: null };
  }
  const r = findAndFill(document, 0);
  if (r.submit) {
    r.submit.click();
    return { filled: r.filled, submitClicked: true };
  }
  return { filled: r.filled, submitClicked: false };
};

const LIST_FIELDS = () => {
  const names = [];
  function walk(root, depth) {
    if (!root || depth > 25) return;
    root.querySelectorAll('input[name], select[name]').forEach(el => {
      const n = el.getAttribute('name');
      if (n) names.push(n);
    });
    root.querySelectorAll('*').forEach(el => {
      if (el.shadowRoot) walk(el.shadowRoot, depth + 1);
    });
  }
  walk(document, 0);
  return names;
};
"##;

/// Shared prelude: args, result reporting and the Formy frame lookup
const PRELUDE_JS: &str = r##"
const { chromium } = require('playwright');

const ARGS = __ARGS__;
const MARKER = '---RESULT---';

function debug(message) {
  if (ARGS.debug) console.error(message);
}

function report(result) {
  console.log(MARKER);
  console.log(JSON.stringify(result));
}

async function openPage(browser) {
  const page = await browser.newPage();
  await page.goto(ARGS.url, { waitUntil: 'networkidle', timeout: ARGS.formTimeoutMs });
  await page.waitForTimeout(ARGS.widgetSettleMs);
  let frames = [];
  for (let i = 0; i < ARGS.widgetPollAttempts; i++) {
    frames = page.frames().filter(f => f !== page.mainFrame() && (f.url() || '').includes('formy'));
    if (frames.length) break;
    await page.waitForTimeout(ARGS.widgetPollIntervalMs);
  }
  return { page, frames };
}

function failure(e) {
  const stage = e && e.name === 'TimeoutError' ? 'timeout' : 'error';
  return { stage, message: String((e && e.message) || e) };
}
"##;

const SUBMIT_MAIN_JS: &str = r##"
(async () => {
  let browser;
  try {
    browser = await chromium.launch({ headless: !ARGS.headed });
    const { page, frames } = await openPage(browser);

    if (ARGS.debug) {
      debug('frame urls: ' + JSON.stringify(page.frames().map(f => f.url())));
      const targets = [['main', page]].concat(frames.map((f, i) => ['frame_formy_' + i, f]));
      for (const [label, target] of targets) {
        try {
          const names = await target.evaluate(LIST_FIELDS);
          debug('[' + label + '] input/select names: ' + JSON.stringify(names));
        } catch (e) {
          debug('[' + label + '] error: ' + e.message);
        }
      }
    }

    let result = null;
    let target = page;
    let targetKind = 'page';
    for (const frame of frames) {
      result = await frame.evaluate(FILL_FORM, ARGS.fields);
      debug('fill in formy frame: filled=' + result.filled + ', submitClicked=' + result.submitClicked);
      if (result.filled >= ARGS.minFilled) {
        target = frame;
        targetKind = 'frame';
        break;
      }
    }
    if (!result || result.filled < ARGS.minFilled) {
      result = await page.evaluate(FILL_FORM, ARGS.fields);
      debug('fill in main page: filled=' + result.filled + ', submitClicked=' + result.submitClicked);
      target = page;
      targetKind = 'page';
    }
    if (result.filled < ARGS.minFilled) {
      report({ stage: 'form_not_found', filled: result.filled });
      return;
    }

    let submitClicked = result.submitClicked;
    if (!submitClicked) {
      const buttons = target.locator('button[type=submit]');
      const button = targetKind === 'page' ? buttons.nth(1) : buttons.first();
      try {
        await button.click({ timeout: ARGS.clickTimeoutMs });
        submitClicked = true;
      } catch (e) {
        report({ stage: 'submit_not_found', filled: result.filled, target: targetKind, message: e.message });
        return;
      }
    }

    let successSeen = false;
    try {
      await target.waitForSelector('text=' + ARGS.successText, { timeout: ARGS.submitTimeoutMs });
      successSeen = true;
    } catch (e) {
      if (!e || e.name !== 'TimeoutError') throw e;
      debug('success text not seen within ' + ARGS.submitTimeoutMs + 'ms');
    }
    let bodyText = '';
    if (!successSeen) {
      bodyText = await target.locator('body').innerText().catch(() => '');
    }
    report({
      stage: 'filled',
      filled: result.filled,
      submitClicked,
      target: targetKind,
      successSeen,
      bodyText,
    });
  } catch (e) {
    report(failure(e));
  } finally {
    if (browser) await browser.close();
  }
})();
"##;

/// Collects inputs, buttons, iframes and shadow hosts of a document
const COLLECT_FORM_JS: &str = r##"
const COLLECT_FORM = () => {
  const result = { inputs: [], buttons: [], iframes: [], shadowHosts: [] };
  function walk(root, depth) {
    if (!root || depth > 20) return;
    try {
      root.querySelectorAll('input:not([type=hidden]), select, textarea').forEach(el => {
        const label = el.labels && el.labels[0] ? el.labels[0].textContent.trim() : '';
        result.inputs.push({
          tag: el.tagName,
          type: el.type || '',
          name: el.name || el.id || '',
          id: el.id || '',
          placeholder: (el.placeholder || '').slice(0, 80),
          label: label.slice(0, 120),
          required: !!el.required,
        });
      });
      root.querySelectorAll('button, [type=submit], input[type=submit]').forEach(el => {
        result.buttons.push({
          tag: el.tagName,
          type: el.type || '',
          text: (el.textContent || el.value || '').trim().slice(0, 80),
        });
      });
      root.querySelectorAll('iframe').forEach(iframe => {
        result.iframes.push({ src: iframe.src || '', id: iframe.id || '' });
      });
      root.querySelectorAll('*').forEach(el => {
        if (el.shadowRoot) {
          result.shadowHosts.push(el.tagName + (el.id ? '#' + el.id : ''));
          walk(el.shadowRoot, depth + 1);
        }
      });
    } catch (e) {}
  }
  walk(document, 0);
  return result;
};
"##;

const DISCOVER_MAIN_JS: &str = r##"
(async () => {
  let browser;
  try {
    browser = await chromium.launch({ headless: !ARGS.headed });
    const { page, frames } = await openPage(browser);
    const main = await page.evaluate(COLLECT_FORM);
    const frameReports = [];
    for (const frame of frames) {
      try {
        frameReports.push({ url: frame.url(), structure: await frame.evaluate(COLLECT_FORM) });
      } catch (e) {
        debug('frame eval error: ' + e.message);
      }
    }
    report({ stage: 'collected', url: page.url(), main, frames: frameReports });
  } catch (e) {
    report(failure(e));
  } finally {
    if (browser) await browser.close();
  }
})();
"##;

/// Timing and behaviour arguments shared by both scripts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommonArgs<'a> {
    url: &'a str,
    headed: bool,
    debug: bool,
    form_timeout_ms: u64,
    widget_settle_ms: u64,
    widget_poll_attempts: u32,
    widget_poll_interval_ms: u64,
}

impl<'a> CommonArgs<'a> {
    fn new(options: &'a BrowserOptions) -> Self {
        Self {
            url: &options.url,
            headed: options.headed,
            debug: options.debug,
            form_timeout_ms: millis(options.form_timeout),
            widget_settle_ms: millis(options.widget_settle),
            widget_poll_attempts: options.widget_poll_attempts,
            widget_poll_interval_ms: millis(options.widget_poll_interval),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormArgs<'a> {
    #[serde(flatten)]
    common: CommonArgs<'a>,
    submit_timeout_ms: u64,
    click_timeout_ms: u64,
    min_filled: u32,
    success_text: &'a str,
    fields: &'a FormFields,
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn assemble(args_json: &str, parts: &[&str]) -> String {
    let mut script = PRELUDE_JS.replace(ARGS_PLACEHOLDER, args_json);
    for part in parts {
        script.push_str(part);
    }
    script
}

/// Script that fills and submits the reading form
pub struct FormScript<'a> {
    fields: &'a FormFields,
    options: &'a BrowserOptions,
}

impl<'a> FormScript<'a> {
    pub fn new(fields: &'a FormFields, options: &'a BrowserOptions) -> Self {
        Self { fields, options }
    }

    /// Render the complete Node.js source
    pub fn render(&self) -> MeterResult<String> {
        let args = FormArgs {
            common: CommonArgs::new(self.options),
            submit_timeout_ms: millis(self.options.submit_timeout),
            click_timeout_ms: millis(self.options.click_timeout),
            min_filled: MIN_FILLED_FIELDS,
            success_text: SUCCESS_TEXT,
            fields: self.fields,
        };
        let json = serde_json::to_string(&args)?;
        Ok(assemble(&json, &[FILL_FORM_JS, SUBMIT_MAIN_JS]))
    }
}

/// Script that dumps the structure of the form page
pub struct DiscoverScript<'a> {
    options: &'a BrowserOptions,
}

impl<'a> DiscoverScript<'a> {
    pub fn new(options: &'a BrowserOptions) -> Self {
        Self { options }
    }

    pub fn render(&self) -> MeterResult<String> {
        let json = serde_json::to_string(&CommonArgs::new(self.options))?;
        Ok(assemble(&json, &[COLLECT_FORM_JS, DISCOVER_MAIN_JS]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, Reading, Tariff};

    fn fields() -> FormFields {
        let reading =
            Reading::validate("12'3", Tariff::Single, Some("100"), None, None).unwrap();
        FormFields::new(&reading, &Contact::new("x@y.ru", ""))
    }

    fn args_of(script: &str) -> serde_json::Value {
        let line = script
            .lines()
            .find(|l| l.starts_with("const ARGS = "))
            .unwrap();
        let json = line
            .trim_start_matches("const ARGS = ")
            .trim_end_matches(';');
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_form_script_embeds_args() {
        let options = BrowserOptions::default();
        let fields = fields();
        let script = FormScript::new(&fields, &options).render().unwrap();

        assert!(!script.contains(ARGS_PLACEHOLDER));
        assert!(script.contains(RESULT_MARKER));
        assert!(script.contains("const FILL_FORM"));

        let args = args_of(&script);
        assert_eq!(args["url"], options.url.as_str());
        assert_eq!(args["headed"], false);
        assert_eq!(args["formTimeoutMs"], 20_000);
        assert_eq!(args["submitTimeoutMs"], 15_000);
        assert_eq!(args["minFilled"], MIN_FILLED_FIELDS);
        assert_eq!(args["successText"], SUCCESS_TEXT);
        assert_eq!(args["fields"]["input-account"], "12'3");
        assert_eq!(args["fields"]["c_night"], "");
    }

    #[test]
    fn test_headed_and_debug_flags() {
        let options = BrowserOptions {
            headed: true,
            debug: true,
            ..Default::default()
        };
        let fields = fields();
        let args = args_of(&FormScript::new(&fields, &options).render().unwrap());
        assert_eq!(args["headed"], true);
        assert_eq!(args["debug"], true);
    }

    #[test]
    fn test_discover_script() {
        let options = BrowserOptions::default();
        let script = DiscoverScript::new(&options).render().unwrap();

        assert!(script.contains("const COLLECT_FORM"));
        assert!(!script.contains("const FILL_FORM"));
        let args = args_of(&script);
        assert_eq!(args["widgetPollAttempts"], 12);
        assert!(args.get("fields").is_none());
    }
}
